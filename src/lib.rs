pub mod error;
pub mod heuristics;
pub mod io;
pub mod models;
pub mod reader;
pub mod stages;

pub use error::{LoadError, SchedulerStopped};
pub use heuristics::{detect_format, FormatDetection, JunkFilter, LineClass};
pub use io::{cleanup_document, fetch_url, load_file, load_stdin, AnalysisReport};
pub use models::{
    DocumentSnapshot, ParagraphContext, PivotParts, Progress, ReaderFrame, SpeakerDirectory,
    TokenizedDocument,
};
pub use reader::{
    spawn_scheduler, split_pivot, FrameResolver, Playback, PlaybackCommand, ReaderConfig,
    ReaderView, SchedulerHandle, Session, TickOutcome,
};
pub use stages::{build_document, normalize, PipelineConfig};

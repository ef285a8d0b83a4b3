pub mod context;
pub mod frame;
pub mod pivot;
pub mod playback;
pub mod scheduler;
pub mod session;

pub use context::*;
pub use frame::*;
pub use pivot::*;
pub use playback::*;
pub use scheduler::*;
pub use session::*;

use serde::{Deserialize, Serialize};

/// Reading configuration consumed by playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Reading rate; 0 disables ticking
    pub words_per_minute: u32,
    /// Keep playing across paragraph boundaries
    pub auto_continue_paragraphs: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            words_per_minute: 300,
            auto_continue_paragraphs: true,
        }
    }
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rsvpipe::{
    fetch_url, load_file, load_stdin, spawn_scheduler, split_pivot, AnalysisReport, FrameResolver,
    LoadError, PipelineConfig, PlaybackCommand, ReaderConfig, ReaderView, Session,
};

#[derive(Parser)]
#[command(name = "rsvpipe")]
#[command(author, version, about = "Speaker-aware rapid serial visual presentation reader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the document comes from; stdin when neither is given
#[derive(Args)]
struct SourceArgs {
    /// Input document (plain text or HTML)
    #[arg(short, long, conflicts_with = "url")]
    input: Option<PathBuf>,

    /// Fetch the document from a URL
    #[arg(long)]
    url: Option<String>,

    /// Speaker-only labels needed before a document counts as a transcript
    #[arg(long, default_value = "3")]
    min_speaker_markers: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl SourceArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            min_speaker_only_markers: self.min_speaker_markers,
            ..Default::default()
        }
    }

    fn name(&self) -> String {
        match (&self.input, &self.url) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(url)) => url.clone(),
            (None, None) => "stdin".to_string(),
        }
    }

    async fn acquire(&self) -> Result<String, LoadError> {
        match (&self.input, &self.url) {
            (Some(path), _) => load_file(path),
            (None, Some(url)) => fetch_url(url).await,
            (None, None) => load_stdin(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a document: format, paragraphs, speaker directory
    Analyze {
        #[command(flatten)]
        source: SourceArgs,

        /// Write the JSON report here
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Read a document word by word in the terminal
    Read {
        #[command(flatten)]
        source: SourceArgs,

        /// Reading rate in words per minute (0 disables)
        #[arg(long, default_value = "300")]
        wpm: u32,

        /// Pause at the end of every paragraph
        #[arg(long)]
        no_auto_continue: bool,
    },

    /// Print every reading frame with its pivot letter
    Frames {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { source, json } => {
            setup_logging(source.verbose, "info");
            analyze_document(source, json).await
        }
        Commands::Read {
            source,
            wpm,
            no_auto_continue,
        } => {
            setup_logging(source.verbose, "warn");
            let reader = ReaderConfig {
                words_per_minute: wpm,
                auto_continue_paragraphs: !no_auto_continue,
            };
            read_document(source, reader).await
        }
        Commands::Frames { source } => {
            setup_logging(source.verbose, "warn");
            print_frames(source).await
        }
    }
}

fn setup_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn load_session(source: &SourceArgs, reader: &ReaderConfig) -> Result<Session> {
    let name = source.name();
    let mut session = Session::new(source.pipeline_config(), reader);
    session
        .load_from(source.acquire().await, &name)
        .with_context(|| format!("Failed to load {}", name))?;
    Ok(session)
}

async fn analyze_document(source: SourceArgs, json: Option<PathBuf>) -> Result<()> {
    let session = load_session(&source, &ReaderConfig::default()).await?;
    let report =
        AnalysisReport::from_snapshot(session.snapshot(), source.name(), &source.pipeline_config());

    print!("{}", report.format_text());

    if let Some(path) = json {
        report.write_json(&path)?;
        info!("Report written to {:?}", path);
    }
    Ok(())
}

async fn print_frames(source: SourceArgs) -> Result<()> {
    let session = load_session(&source, &ReaderConfig::default()).await?;
    let resolver = FrameResolver::new(session.snapshot());

    for (start, frame) in resolver.frames() {
        let parts = split_pivot(&frame.display_text);
        println!("{:>6}  {}[{}]{}", start, parts.left, parts.pivot, parts.right);
    }
    Ok(())
}

const PIVOT_COLUMN: usize = 20;

fn render(view: &ReaderView) -> String {
    let pad = PIVOT_COLUMN.saturating_sub(view.pivot.left.chars().count());
    let speaker = view
        .speaker
        .as_deref()
        .map(|s| format!("  ({})", s))
        .unwrap_or_default();
    let status = if view.paused_at_boundary {
        "  [end of paragraph: Enter to continue]"
    } else if !view.is_playing {
        "  [paused]"
    } else {
        ""
    };

    format!(
        "\r\x1b[2K{}{}\x1b[1;31m{}\x1b[0m{}    {}/{} ¶{}/{}{}{}",
        " ".repeat(pad),
        view.pivot.left,
        view.pivot.pivot,
        view.pivot.right,
        view.progress.token,
        view.progress.total_tokens,
        view.progress.paragraph,
        view.progress.total_paragraphs,
        speaker,
        status
    )
}

fn finished(view: &ReaderView) -> bool {
    !view.is_playing
        && !view.paused_at_boundary
        && view.progress.token == view.progress.total_tokens
}

async fn read_document(source: SourceArgs, reader: ReaderConfig) -> Result<()> {
    let keyboard_enabled = source.input.is_some() || source.url.is_some();
    let session = load_session(&source, &reader).await?;
    let (mut handle, task) = spawn_scheduler(session.into_playback());

    let mut keys = BufReader::new(tokio::io::stdin()).lines();
    let mut keyboard_open = keyboard_enabled;
    let mut stdout = std::io::stdout();

    handle.send(PlaybackCommand::Play).await?;

    loop {
        tokio::select! {
            view = handle.changed() => {
                let view = view?;
                write!(stdout, "{}", render(&view))?;
                stdout.flush()?;

                if finished(&view) {
                    break;
                }
                if view.paused_at_boundary && !keyboard_open {
                    handle.send(PlaybackCommand::Play).await?;
                }
            }

            line = keys.next_line(), if keyboard_open => {
                match line.context("Failed to read keyboard input")? {
                    Some(line) if line.trim() == "q" => break,
                    Some(_) => handle.send(PlaybackCommand::Toggle).await?,
                    None => keyboard_open = false,
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    writeln!(stdout)?;
    handle.shutdown().await?;
    let playback = task.await.context("Playback scheduler panicked")?;
    info!(
        "Stopped at token {} of {}",
        playback.state().current_index + 1,
        playback.snapshot().total_tokens()
    );
    Ok(())
}

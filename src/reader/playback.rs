use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::models::{DocumentSnapshot, ReaderFrame};

use super::{reader_view, FrameResolver, ReaderConfig, ReaderView};

/// Mutable reading position over the current snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub words_per_minute: u32,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing happened
    Idle,
    Advanced { from: usize, to: usize },
    /// Stopped on the last frame of a paragraph
    ParagraphBoundary { index: usize },
    /// Stopped on the last token of the document
    Finished,
}

/// Playback state machine: Stopped <-> Playing.
///
/// Holds a shared reference to an immutable snapshot plus the position.
/// All transitions are synchronous; timing is driven from outside by
/// calling [`Playback::tick`] every [`Playback::interval`].
#[derive(Debug, Clone)]
pub struct Playback {
    snapshot: Arc<DocumentSnapshot>,
    state: PlaybackState,
    auto_continue_paragraphs: bool,
    paused_at_boundary: bool,
}

/// Tick period for a reading rate; `None` disables ticking.
///
/// Rates above 60 000 wpm are floored to a 1 ms period.
pub fn tick_interval(words_per_minute: u32) -> Option<Duration> {
    if words_per_minute == 0 {
        None
    } else {
        let millis = (60_000 / words_per_minute as u64).max(1);
        Some(Duration::from_millis(millis))
    }
}

impl Playback {
    pub fn new(snapshot: Arc<DocumentSnapshot>, config: &ReaderConfig) -> Self {
        Self {
            snapshot,
            state: PlaybackState {
                current_index: 0,
                is_playing: false,
                words_per_minute: config.words_per_minute,
            },
            auto_continue_paragraphs: config.auto_continue_paragraphs,
            paused_at_boundary: false,
        }
    }

    pub fn snapshot(&self) -> &Arc<DocumentSnapshot> {
        &self.snapshot
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn paused_at_boundary(&self) -> bool {
        self.paused_at_boundary
    }

    pub fn auto_continue_paragraphs(&self) -> bool {
        self.auto_continue_paragraphs
    }

    /// Current tick period, `None` when the rate disables ticking
    pub fn interval(&self) -> Option<Duration> {
        tick_interval(self.state.words_per_minute)
    }

    fn resolver(&self) -> FrameResolver<'_> {
        FrameResolver::new(&self.snapshot)
    }

    fn last_index(&self) -> Option<usize> {
        self.snapshot.total_tokens().checked_sub(1)
    }

    fn set_index(&mut self, global: usize) {
        self.state.current_index = self.snapshot.document.clamp_index(global).unwrap_or(0);
        self.paused_at_boundary = false;
    }

    /// Swap in a new snapshot: stop, and move to the start
    pub fn load(&mut self, snapshot: Arc<DocumentSnapshot>) {
        self.state.is_playing = false;
        self.snapshot = snapshot;
        self.set_index(0);
        debug!(
            "Loaded snapshot {} ({} tokens)",
            self.snapshot.id,
            self.snapshot.total_tokens()
        );
    }

    /// Start playing. Resuming from a paragraph-boundary pause first steps
    /// past the boundary frame.
    ///
    /// Returns false when there is nothing to play.
    pub fn play(&mut self) -> bool {
        let Some(last) = self.last_index() else {
            return false;
        };

        if self.paused_at_boundary && !self.auto_continue_paragraphs {
            let advance = self.resolver().advance_at(self.state.current_index);
            self.state.current_index = (self.state.current_index + advance).min(last);
        }
        self.paused_at_boundary = false;
        self.state.is_playing = true;
        true
    }

    pub fn pause(&mut self) {
        self.state.is_playing = false;
    }

    pub fn toggle(&mut self) -> bool {
        if self.state.is_playing {
            self.pause();
            false
        } else {
            self.play()
        }
    }

    /// Stop and return to the first token
    pub fn reset(&mut self) {
        self.state.is_playing = false;
        self.set_index(0);
    }

    /// Change the rate; the position is kept
    pub fn set_words_per_minute(&mut self, words_per_minute: u32) {
        self.state.words_per_minute = words_per_minute;
    }

    pub fn set_auto_continue(&mut self, auto_continue: bool) {
        self.auto_continue_paragraphs = auto_continue;
    }

    /// Jump to any index, clamped
    pub fn seek(&mut self, global: usize) {
        self.set_index(global);
    }

    /// One frame back, landing on the start of a merged frame
    pub fn rewind(&mut self) {
        let target = self.resolver().previous_frame_start(self.state.current_index);
        self.set_index(target);
    }

    /// One frame forward
    pub fn step_forward(&mut self) {
        let advance = self.resolver().advance_at(self.state.current_index);
        self.set_index(self.state.current_index + advance);
    }

    /// First token of the next paragraph; stays in the last paragraph
    pub fn next_paragraph(&mut self) {
        if let Some(position) = self.snapshot.document.locate(self.state.current_index) {
            let target = self.snapshot.document.paragraph_start(position.paragraph + 1);
            self.set_index(target);
        }
    }

    /// Start of the current paragraph, or of the previous one when already there
    pub fn previous_paragraph(&mut self) {
        if let Some(position) = self.snapshot.document.locate(self.state.current_index) {
            let target = if position.local == 0 {
                self.snapshot
                    .document
                    .paragraph_start(position.paragraph.saturating_sub(1))
            } else {
                self.snapshot.document.paragraph_start(position.paragraph)
            };
            self.set_index(target);
        }
    }

    pub fn current_frame(&self) -> Option<ReaderFrame> {
        self.resolver().frame_at(self.state.current_index)
    }

    /// Advance by one frame if playing.
    ///
    /// Stops on the last token of the document, and, unless auto-continue is
    /// on, on the last frame of the current paragraph.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_playing {
            return TickOutcome::Idle;
        }

        let Some(last) = self.last_index() else {
            self.state.is_playing = false;
            return TickOutcome::Finished;
        };

        let from = self.state.current_index;
        if from >= last {
            self.state.is_playing = false;
            return TickOutcome::Finished;
        }

        let advance = self.resolver().advance_at(from);

        if !self.auto_continue_paragraphs {
            let paragraph_end = self
                .snapshot
                .document
                .locate(from)
                .map(|p| self.snapshot.document.paragraph_range(p.paragraph).end - 1)
                .unwrap_or(last);
            if from + advance > paragraph_end {
                self.state.is_playing = false;
                self.paused_at_boundary = true;
                debug!("Paused at paragraph boundary, index {}", from);
                return TickOutcome::ParagraphBoundary { index: from };
            }
        }

        let to = (from + advance).min(last);
        self.state.current_index = to;
        TickOutcome::Advanced { from, to }
    }

    /// Render-side view of the current position
    pub fn view(&self) -> ReaderView {
        reader_view(
            &self.snapshot,
            self.state.current_index,
            self.state.is_playing,
            self.paused_at_boundary,
        )
    }
}

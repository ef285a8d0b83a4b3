use serde::Serialize;
use uuid::Uuid;

use crate::models::{DocumentSnapshot, ParagraphContext, PivotParts, Progress, ReaderFrame};

use super::{split_pivot, FrameResolver};

/// Everything the rendering side needs for the current position
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReaderView {
    pub snapshot_id: Option<Uuid>,
    pub index: usize,
    pub frame: Option<ReaderFrame>,
    pub pivot: PivotParts,
    pub context: ParagraphContext,
    pub progress: Progress,
    /// Canonical speaker of the current paragraph
    pub speaker: Option<String>,
    pub is_playing: bool,
    pub paused_at_boundary: bool,
}

/// Words before, inside, and after the frame at `global`, within its paragraph
pub fn paragraph_context(snapshot: &DocumentSnapshot, global: usize) -> ParagraphContext {
    let resolver = FrameResolver::new(snapshot);
    let Some(position) = snapshot.document.locate(global) else {
        return ParagraphContext::default();
    };

    let tokens = &snapshot.document.paragraphs[position.paragraph].tokens;
    let advance = resolver.advance_at(global);
    let active_end = (position.local + advance).min(tokens.len());

    ParagraphContext {
        before: tokens[..position.local].to_vec(),
        active: tokens[position.local..active_end].to_vec(),
        after: tokens[active_end..].to_vec(),
    }
}

/// One-based token and paragraph counters for `global`
pub fn progress(snapshot: &DocumentSnapshot, global: usize) -> Progress {
    let document = &snapshot.document;
    match (document.clamp_index(global), document.locate(global)) {
        (Some(index), Some(position)) => Progress {
            token: index + 1,
            total_tokens: document.total_tokens(),
            paragraph: position.paragraph + 1,
            total_paragraphs: document.paragraph_count(),
        },
        _ => Progress::default(),
    }
}

/// Build the full view for a position
pub fn reader_view(
    snapshot: &DocumentSnapshot,
    global: usize,
    is_playing: bool,
    paused_at_boundary: bool,
) -> ReaderView {
    let resolver = FrameResolver::new(snapshot);
    let index = snapshot.document.clamp_index(global).unwrap_or(0);
    let frame = resolver.frame_at(index);
    let pivot = frame
        .as_ref()
        .map(|f| split_pivot(&f.display_text))
        .unwrap_or_default();
    let speaker = snapshot
        .document
        .locate(index)
        .and_then(|p| snapshot.paragraph_speaker(p.paragraph));

    ReaderView {
        snapshot_id: Some(snapshot.id),
        index,
        frame,
        pivot,
        context: paragraph_context(snapshot, index),
        progress: progress(snapshot, index),
        speaker,
        is_playing,
        paused_at_boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{build_document, PipelineConfig};

    fn snapshot() -> DocumentSnapshot {
        build_document(
            "Jane Doe (00:01): Intro.\nBob Roe (00:02): Thanks Jane Doe for having me.",
            &PipelineConfig::default(),
        )
    }

    #[test]
    fn test_context_groups_merged_frame() {
        let snapshot = snapshot();
        // Paragraph 1: ["Bob Roe:", "Thanks", "Jane", "Doe", "for", "having", "me."]
        let global = snapshot.document.paragraph_start(1) + 2;
        let context = paragraph_context(&snapshot, global);

        assert_eq!(context.before, vec!["Bob Roe:", "Thanks"]);
        assert_eq!(context.active, vec!["Jane", "Doe"]);
        assert_eq!(context.after, vec!["for", "having", "me."]);
    }

    #[test]
    fn test_progress_counters() {
        let snapshot = snapshot();
        let p = progress(&snapshot, 2);
        assert_eq!(p.token, 3);
        assert_eq!(p.total_tokens, 9);
        assert_eq!(p.paragraph, 2);
        assert_eq!(p.total_paragraphs, 2);
    }

    #[test]
    fn test_view_for_empty_snapshot() {
        let view = reader_view(&DocumentSnapshot::empty(), 3, false, false);
        assert_eq!(view.frame, None);
        assert_eq!(view.pivot, PivotParts::default());
        assert_eq!(view.progress, Progress::default());
    }

    #[test]
    fn test_view_carries_speaker_and_pivot() {
        let snapshot = snapshot();
        let view = reader_view(&snapshot, 0, true, false);
        assert_eq!(view.speaker.as_deref(), Some("Jane Doe"));
        assert_eq!(view.pivot.text(), "Jane Doe:");
        assert!(view.is_playing);
    }
}

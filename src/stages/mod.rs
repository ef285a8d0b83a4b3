pub mod stage0_normalize;
pub mod stage1_segment;
pub mod stage2_tokenize;
pub mod stage3_directory;

pub use stage0_normalize::*;
pub use stage1_segment::*;
pub use stage2_tokenize::*;
pub use stage3_directory::*;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::heuristics::{detect_format_with, JunkFilter, MIN_SPEAKER_ONLY_MARKERS};
use crate::models::{DocumentSnapshot, TokenizedDocument};

/// Tunable constants for the text pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Speaker-only labels needed before they count as speaker turns
    pub min_speaker_only_markers: usize,
    /// Lines shorter than this are junk
    pub min_junk_length: usize,
    /// Unpunctuated lowercase lines shorter than this are junk
    pub short_fragment_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_speaker_only_markers: MIN_SPEAKER_ONLY_MARKERS,
            min_junk_length: 3,
            short_fragment_length: 10,
        }
    }
}

impl PipelineConfig {
    pub fn junk_filter(&self) -> JunkFilter {
        JunkFilter::new(self.min_junk_length, self.short_fragment_length)
    }
}

/// Run the whole pipeline over one raw document.
///
/// raw text -> normalized text -> paragraphs -> (tokens, directory),
/// bundled into a fresh immutable snapshot.
pub fn build_document(raw: &str, config: &PipelineConfig) -> DocumentSnapshot {
    let normalized = normalize(raw);

    let format = detect_format_with(&normalized, config.min_speaker_only_markers);
    let speaker_only_labels = format.speaker_only_markers >= config.min_speaker_only_markers.max(1);
    info!(
        "Format: transcript={} ({} timestamped, {} speaker-only markers)",
        format.is_transcript, format.timestamped_markers, format.speaker_only_markers
    );

    let segmentation = segment(&normalized, &format, config);
    let paragraphs = build_paragraphs(
        &segmentation.paragraphs,
        &config.junk_filter(),
        speaker_only_labels,
    );
    let directory = build_directory(&normalized, &paragraphs, speaker_only_labels);
    let document = TokenizedDocument::new(paragraphs);

    info!(
        "Document ready: {} paragraphs, {} tokens, {} speakers",
        document.paragraph_count(),
        document.total_tokens(),
        directory.speakers().len()
    );

    DocumentSnapshot::new(format, document, directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_document_transcript() {
        let raw = "Jane Doe (00:01): Hello Bob.\r\nBob Roe (00:03): Hi Jane Doe, welcome.\r\n";
        let snapshot = build_document(raw, &PipelineConfig::default());

        assert!(snapshot.format.is_transcript);
        assert_eq!(snapshot.paragraph_count(), 2);
        assert_eq!(
            snapshot.document.paragraphs[1].tokens,
            vec!["Bob Roe:", "Hi", "Jane", "Doe,", "welcome."]
        );
        assert_eq!(snapshot.paragraph_speaker(0).as_deref(), Some("Jane Doe"));
        assert_eq!(snapshot.directory.resolve("Roe"), Some("Bob Roe"));
    }

    #[test]
    fn test_prose_heading_is_not_a_speaker() {
        let snapshot = build_document(
            "Note: read this.\n\nSome prose follows.",
            &PipelineConfig::default(),
        );

        assert!(!snapshot.format.is_transcript);
        assert_eq!(snapshot.document.paragraphs[0].tokens, vec!["Note:", "read", "this."]);
        assert_eq!(snapshot.paragraph_speaker(0), None);
        assert!(snapshot.directory.is_empty());
    }

    #[test]
    fn test_speaker_only_labels_above_threshold_are_speakers() {
        let raw = "Ann Lee: Hi.\nBob: Hello.\nAnn Lee: Bye.\nBob: Later.";
        let snapshot = build_document(raw, &PipelineConfig::default());

        assert!(snapshot.format.is_transcript);
        assert_eq!(snapshot.paragraph_speaker(0).as_deref(), Some("Ann Lee"));
        assert_eq!(snapshot.paragraph_speaker(1).as_deref(), Some("Bob"));
    }

    #[test]
    fn test_build_document_empty_input() {
        let snapshot = build_document(" \n\u{200B}\n ", &PipelineConfig::default());
        assert!(snapshot.document.is_empty());
        assert!(!snapshot.format.is_transcript);
    }

    #[test]
    fn test_snapshots_have_distinct_ids() {
        let config = PipelineConfig::default();
        let a = build_document("one", &config);
        let b = build_document("one", &config);
        assert_ne!(a.id, b.id);
        assert_eq!(a.document, b.document);
    }
}

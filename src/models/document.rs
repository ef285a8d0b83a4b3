use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::heuristics::FormatDetection;

use super::{SpeakerDirectory, TokenizedDocument};

/// Everything derived from one submitted document.
///
/// Built wholesale by the pipeline and never mutated afterwards; a new
/// document produces a new snapshot with a new id.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub format: FormatDetection,
    pub document: TokenizedDocument,
    pub directory: SpeakerDirectory,
}

impl DocumentSnapshot {
    pub fn new(
        format: FormatDetection,
        document: TokenizedDocument,
        directory: SpeakerDirectory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            format,
            document,
            directory,
        }
    }

    /// Snapshot with no content
    pub fn empty() -> Self {
        Self::new(
            FormatDetection {
                is_transcript: false,
                timestamped_markers: 0,
                speaker_only_markers: 0,
                matched_rule: None,
            },
            TokenizedDocument::default(),
            SpeakerDirectory::default(),
        )
    }

    pub fn total_tokens(&self) -> usize {
        self.document.total_tokens()
    }

    pub fn paragraph_count(&self) -> usize {
        self.document.paragraph_count()
    }

    /// Canonical speaker of a paragraph opening with a head token.
    ///
    /// A directory miss falls back to the head label as written.
    pub fn paragraph_speaker(&self, paragraph: usize) -> Option<String> {
        let label = self.document.paragraphs.get(paragraph)?.head_label()?;
        Some(
            self.directory
                .resolve(label)
                .unwrap_or(label)
                .to_string(),
        )
    }
}

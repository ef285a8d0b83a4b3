use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::heuristics::FormatDetection;
use crate::models::{DirectoryEntry, DocumentSnapshot};
use crate::reader::FrameResolver;
use crate::stages::PipelineConfig;

/// Machine-readable summary of a processed document
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub format: FormatDetection,
    pub paragraphs: Vec<ParagraphSummary>,
    /// Directory entries sorted by key
    pub directory: Vec<DirectoryEntry>,
    /// Distinct canonical speakers
    pub speakers: Vec<String>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParagraphSummary {
    pub index: usize,
    pub start: usize,
    pub token_count: usize,
    pub speaker: Option<String>,
    /// First few tokens, for orientation
    pub preview: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub snapshot_id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub total_tokens: usize,
    pub total_paragraphs: usize,
    pub total_frames: usize,
    pub merged_frames: usize,
    pub pipeline: PipelineConfig,
}

const PREVIEW_TOKENS: usize = 8;

impl AnalysisReport {
    pub fn from_snapshot(
        snapshot: &DocumentSnapshot,
        source: impl Into<String>,
        pipeline: &PipelineConfig,
    ) -> Self {
        let document = &snapshot.document;

        let paragraphs = document
            .paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| {
                let mut preview = paragraph
                    .tokens
                    .iter()
                    .take(PREVIEW_TOKENS)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ");
                if paragraph.token_count() > PREVIEW_TOKENS {
                    preview.push_str(" ...");
                }
                ParagraphSummary {
                    index,
                    start: document.paragraph_start(index),
                    token_count: paragraph.token_count(),
                    speaker: snapshot.paragraph_speaker(index),
                    preview,
                }
            })
            .collect();

        let frames = FrameResolver::new(snapshot).frames();
        let merged_frames = frames.iter().filter(|(_, f)| f.is_merged()).count();

        Self {
            source: source.into(),
            format: snapshot.format,
            paragraphs,
            directory: snapshot.directory.entries().into_iter().cloned().collect(),
            speakers: snapshot
                .directory
                .speakers()
                .into_iter()
                .map(str::to_string)
                .collect(),
            metadata: ReportMetadata {
                snapshot_id: snapshot.id,
                loaded_at: snapshot.loaded_at,
                total_tokens: document.total_tokens(),
                total_paragraphs: document.paragraph_count(),
                total_frames: frames.len(),
                merged_frames,
                pipeline: pipeline.clone(),
            },
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }

    /// Human-readable rendering
    pub fn format_text(&self) -> String {
        let mut out = String::new();
        let kind = if self.format.is_transcript {
            "transcript"
        } else {
            "prose"
        };

        out.push_str("Document Analysis\n");
        out.push_str("=================\n");
        out.push_str(&format!("Source: {}\n", self.source));
        out.push_str(&format!(
            "Format: {} ({} timestamped, {} speaker-only markers)\n",
            kind, self.format.timestamped_markers, self.format.speaker_only_markers
        ));
        out.push_str(&format!(
            "Tokens: {}  Paragraphs: {}  Frames: {} ({} merged)\n",
            self.metadata.total_tokens,
            self.metadata.total_paragraphs,
            self.metadata.total_frames,
            self.metadata.merged_frames
        ));

        if !self.speakers.is_empty() {
            out.push_str("\nSpeakers\n--------\n");
            for speaker in &self.speakers {
                let keys: Vec<&str> = self
                    .directory
                    .iter()
                    .filter(|e| &e.canonical == speaker)
                    .map(|e| e.key.as_str())
                    .collect();
                out.push_str(&format!("{} [{}]\n", speaker, keys.join(", ")));
            }
        }

        out.push_str("\nParagraphs\n----------\n");
        for paragraph in &self.paragraphs {
            let speaker = paragraph.speaker.as_deref().unwrap_or("-");
            out.push_str(&format!(
                "#{:<4} {:>5} tokens  {:<20} {}\n",
                paragraph.index + 1,
                paragraph.token_count,
                speaker,
                paragraph.preview
            ));
        }

        out
    }

    /// Write the text rendering to a file
    pub fn write_text(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format_text())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::build_document;

    fn report() -> AnalysisReport {
        let config = PipelineConfig::default();
        let snapshot = build_document(
            "Dr. Jane Doe (00:01): Welcome, everyone.\nBob Roe (00:04): Thanks Jane Doe.",
            &config,
        );
        AnalysisReport::from_snapshot(&snapshot, "interview.txt", &config)
    }

    #[test]
    fn test_report_counts() {
        let report = report();
        assert!(report.format.is_transcript);
        assert_eq!(report.paragraphs.len(), 2);
        assert_eq!(report.paragraphs[0].speaker.as_deref(), Some("Jane Doe"));
        assert_eq!(report.paragraphs[1].speaker.as_deref(), Some("Bob Roe"));
        assert_eq!(report.paragraphs[1].start, report.paragraphs[0].token_count);
        assert_eq!(report.speakers, vec!["Bob Roe", "Jane Doe"]);
        assert_eq!(report.metadata.merged_frames, 1);
        assert_eq!(
            report.metadata.total_tokens,
            report.paragraphs.iter().map(|p| p.token_count).sum::<usize>()
        );
    }

    #[test]
    fn test_json_shape() {
        let report = report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["format"]["is_transcript"], true);
        assert_eq!(json["metadata"]["pipeline"]["min_speaker_only_markers"], 3);
        assert!(json["directory"].as_array().unwrap().len() >= 4);
    }

    #[test]
    fn test_write_json_and_text() {
        let report = report();
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("report.json");
        report.write_json(&json_path).unwrap();
        let written = std::fs::read_to_string(&json_path).unwrap();
        assert!(written.contains("\"interview.txt\""));

        let text_path = dir.path().join("report.txt");
        report.write_text(&text_path).unwrap();
        let text = std::fs::read_to_string(&text_path).unwrap();
        assert!(text.contains("Format: transcript (2 timestamped"));
        assert!(text.contains("Jane Doe ["));
    }
}

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::heuristics::{
    find_speaker_only_markers, find_timestamped_markers, leading_marker, FormatDetection,
    MarkerKind, SpeakerMarker,
};

use super::PipelineConfig;

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("invalid blank line regex"));

/// How the paragraphs were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentMode {
    /// Split at timestamped speaker markers
    Transcript,
    /// Split on blank lines, then speaker blocks recovered
    Plain,
}

/// Result of Stage 1 segmentation
#[derive(Debug, Clone)]
pub struct SegmentationResult {
    /// Raw paragraph text, in document order
    pub paragraphs: Vec<String>,
    pub mode: SegmentMode,
    /// Same-speaker markers folded into the running paragraph
    pub continuations: usize,
    /// Plain paragraphs absorbed into a preceding speaker block
    pub absorbed: usize,
}

/// Perform Stage 1: paragraph segmentation
///
/// Transcript mode is used when the text carries timestamped markers.
/// Otherwise the text is split on blank lines and a recovery pass rebuilds
/// speaker blocks from leading labels.
pub fn segment(
    text: &str,
    format: &FormatDetection,
    config: &PipelineConfig,
) -> SegmentationResult {
    let markers = if format.timestamped_markers > 0 {
        find_timestamped_markers(text)
    } else {
        Vec::new()
    };

    let result = if markers.is_empty() {
        segment_plain(text, config)
    } else {
        segment_transcript(text, &markers)
    };

    info!(
        "Stage 1: {} paragraphs ({:?} mode, {} continuations, {} absorbed)",
        result.paragraphs.len(),
        result.mode,
        result.continuations,
        result.absorbed
    );

    result
}

/// Remove a "same speaker resumes" ellipsis from the start of a turn
fn strip_leading_ellipsis(text: &str) -> &str {
    let mut rest = text.trim_start();
    loop {
        if let Some(tail) = rest.strip_prefix('…') {
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("...") {
            rest = tail;
        } else {
            break;
        }
    }
    rest.trim_start()
}

fn segment_transcript(text: &str, markers: &[SpeakerMarker]) -> SegmentationResult {
    let mut paragraphs = split_blank_lines(&text[..markers[0].start]);
    let mut continuations = 0;
    // (speaker key, paragraph text) of the open paragraph
    let mut current: Option<(String, String)> = None;

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
        let key = marker.speaker_key();

        match current.as_mut() {
            Some((active, paragraph)) if *active == key => {
                let body = strip_leading_ellipsis(text[marker.end..end].trim());
                if !body.is_empty() {
                    paragraph.push(' ');
                    paragraph.push_str(body);
                }
                continuations += 1;
                debug!("Continuation for speaker '{}' at byte {}", key, marker.start);
            }
            _ => {
                if let Some((_, paragraph)) = current.take() {
                    paragraphs.push(paragraph);
                }
                current = Some((key, text[marker.start..end].trim().to_string()));
            }
        }
    }

    if let Some((_, paragraph)) = current {
        paragraphs.push(paragraph);
    }

    SegmentationResult {
        paragraphs,
        mode: SegmentMode::Transcript,
        continuations,
        absorbed: 0,
    }
}

fn split_blank_lines(text: &str) -> Vec<String> {
    BLANK_LINES
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a candidate paragraph before every line that opens with a speaker
/// label. Cuts fall at the start of the line, so words trimmed off the
/// front of the label stay with it.
fn split_at_speaker_lines(paragraph: &str) -> Vec<String> {
    let mut cuts: Vec<usize> = find_speaker_only_markers(paragraph)
        .iter()
        .map(|m| paragraph[..m.start].rfind('\n').map_or(0, |i| i + 1))
        .filter(|&start| start > 0)
        .collect();
    cuts.dedup();

    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut last = 0;
    for cut in cuts {
        pieces.push(&paragraph[last..cut]);
        last = cut;
    }
    pieces.push(&paragraph[last..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn segment_plain(text: &str, config: &PipelineConfig) -> SegmentationResult {
    let speaker_only_qualifies =
        find_speaker_only_markers(text).len() >= config.min_speaker_only_markers.max(1);

    let mut candidates = split_blank_lines(text);
    if speaker_only_qualifies {
        candidates = candidates
            .iter()
            .flat_map(|p| split_at_speaker_lines(p))
            .collect();
    }
    let candidate_count = candidates.len();

    let (paragraphs, absorbed) = recover_speaker_blocks(candidates, speaker_only_qualifies);
    debug!(
        "Recovery merge: {} candidates -> {} paragraphs",
        candidate_count,
        paragraphs.len()
    );

    SegmentationResult {
        paragraphs,
        mode: SegmentMode::Plain,
        continuations: 0,
        absorbed,
    }
}

/// Whether a paragraph opens with a speaker label that counts
fn opens_speaker_block(paragraph: &str, speaker_only_qualifies: bool) -> bool {
    leading_marker(paragraph).is_some_and(|m| match m.kind {
        MarkerKind::Timestamped => true,
        MarkerKind::SpeakerOnly => speaker_only_qualifies,
    })
}

/// Recovery merge pass: a paragraph opening with a speaker label absorbs
/// every following paragraph until the next one that opens a block.
fn recover_speaker_blocks(
    candidates: Vec<String>,
    speaker_only_qualifies: bool,
) -> (Vec<String>, usize) {
    let mut paragraphs: Vec<String> = Vec::with_capacity(candidates.len());
    let mut in_block = false;
    let mut absorbed = 0;

    for candidate in candidates {
        if opens_speaker_block(&candidate, speaker_only_qualifies) {
            in_block = true;
            paragraphs.push(candidate);
            continue;
        }

        match paragraphs.last_mut() {
            Some(block) if in_block => {
                block.push_str("\n\n");
                block.push_str(&candidate);
                absorbed += 1;
            }
            _ => paragraphs.push(candidate),
        }
    }

    (paragraphs, absorbed)
}

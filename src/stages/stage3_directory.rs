use tracing::{debug, info};

use crate::heuristics::{find_timestamped_markers, leading_marker, MarkerKind, SpeakerMarker};
use crate::models::{Paragraph, SpeakerDirectory};

/// Perform Stage 3: build the speaker directory.
///
/// Two sources feed one insert-or-extend operation:
/// 1. every timestamped marker in the normalized, pre-segmentation text
/// 2. markers in each paragraph's raw text, including a leading
///    speaker-only label when those are recognized
///
/// Registering the same name twice is a no-op, so overlap between the
/// sources is harmless.
pub fn build_directory(
    normalized: &str,
    paragraphs: &[Paragraph],
    speaker_only_labels: bool,
) -> SpeakerDirectory {
    let mut directory = SpeakerDirectory::new();

    let document_markers = find_timestamped_markers(normalized);
    let paragraph_markers = paragraphs
        .iter()
        .flat_map(|p| paragraph_markers(&p.raw_text, speaker_only_labels));

    let mut seen = 0;
    for marker in document_markers.into_iter().chain(paragraph_markers) {
        seen += 1;
        let canonical = marker.canonical_name();
        let changed = directory.register_name(&canonical);
        if changed > 0 {
            debug!("Registered '{}' ({} keys)", canonical, changed);
        }
    }

    info!(
        "Stage 3: {} markers -> {} directory keys, {} speakers",
        seen,
        directory.len(),
        directory.speakers().len()
    );

    directory
}

fn paragraph_markers(raw: &str, speaker_only_labels: bool) -> Vec<SpeakerMarker> {
    let mut markers = find_timestamped_markers(raw);
    if speaker_only_labels {
        if let Some(lead) = leading_marker(raw).filter(|m| m.kind == MarkerKind::SpeakerOnly) {
            markers.push(lead);
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(raw: &str) -> Paragraph {
        Paragraph::new(raw, raw.split_whitespace().map(str::to_string).collect())
    }

    #[test]
    fn test_directory_from_timestamped_markers() {
        let text = "Dr. Jane Doe (00:01): Hello.\nSpeaker 2 (00:04): Hi.";
        let directory = build_directory(text, &[], false);

        assert_eq!(directory.resolve("Jane"), Some("Jane Doe"));
        assert_eq!(directory.resolve("Doe"), Some("Jane Doe"));
        assert_eq!(directory.resolve("jane doe"), Some("Jane Doe"));
        assert_eq!(directory.resolve("Speaker 2"), Some("Speaker 2"));
        assert_eq!(directory.resolve("2"), Some("Speaker 2"));
        assert!(!directory.contains_key("Dr"));
    }

    #[test]
    fn test_garbled_names_are_deduplicated() {
        let text = "John John Smith Smith (00:01): ok";
        let directory = build_directory(text, &[], false);
        assert_eq!(directory.resolve("John Smith"), Some("John Smith"));
        assert_eq!(directory.resolve("Smith"), Some("John Smith"));
    }

    #[test]
    fn test_longer_name_wins_over_later_abbreviation() {
        let text = "Jane (00:01): hi. Jane Doe (00:02): hello. Jane (00:03): again.";
        let directory = build_directory(text, &[], false);
        assert_eq!(directory.resolve("Jane"), Some("Jane Doe"));
    }

    #[test]
    fn test_second_pass_picks_up_speaker_only_heads() {
        let paragraphs = vec![para("Alice Cooper: Hello."), para("Bob: Hi.")];
        let without = build_directory("", &paragraphs, false);
        assert!(without.is_empty());

        let with = build_directory("", &paragraphs, true);
        assert_eq!(with.resolve("Cooper"), Some("Alice Cooper"));
        assert_eq!(with.resolve("Bob"), Some("Bob"));
    }
}

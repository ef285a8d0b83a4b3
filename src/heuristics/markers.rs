use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::names::{dedupe_name, trim_leading_stop_words};
use super::TITLE_WORDS;

/// Default number of speaker-only markers needed before a document counts
/// as a transcript. Ordinary prose headings ("Chapter:", "Note:") rarely
/// repeat this often.
pub const MIN_SPEAKER_ONLY_MARKERS: usize = 3;

/// Which marker family a speaker label belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// `Name (mm:ss):` or `Name (hh:mm:ss):`
    Timestamped,
    /// `Name:` at the start of a line
    SpeakerOnly,
}

/// A speaker label found in text, with byte offsets into the scanned string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerMarker {
    /// Byte offset of the first character of the label (title or name)
    pub start: usize,
    /// Byte offset just past the label's trailing colon
    pub end: usize,
    /// Title as written, e.g. `Dr.`
    pub title: Option<String>,
    /// Name portion as written, leading stop words removed
    pub name: String,
    /// Timestamp text inside the parentheses
    pub timestamp: Option<String>,
    pub kind: MarkerKind,
}

impl SpeakerMarker {
    /// Name with immediate repetitions collapsed
    pub fn canonical_name(&self) -> String {
        dedupe_name(&self.name)
    }

    /// Case-folded name used to decide whether two turns share a speaker
    pub fn speaker_key(&self) -> String {
        self.canonical_name().to_lowercase()
    }
}

/// Outcome of format detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDetection {
    pub is_transcript: bool,
    pub timestamped_markers: usize,
    pub speaker_only_markers: usize,
    /// The rule that declared the document a transcript, if any
    pub matched_rule: Option<MarkerKind>,
}

/// One row of the format decision table
#[derive(Debug, Clone, Copy)]
struct FormatRule {
    kind: MarkerKind,
    min_count: usize,
}

fn title_alternation() -> String {
    let mut titles: Vec<&str> = TITLE_WORDS.to_vec();
    // Longest first so "Mrs" is tried before "Mr"
    titles.sort_by_key(|t| std::cmp::Reverse(t.len()));
    titles.join("|")
}

fn label_body() -> String {
    let word = r"\p{Lu}[\p{L}\p{M}'’\-]*";
    format!(
        r"(?:(?P<title>(?:{titles})\.?)[ \t]+)?(?P<name>Speaker[ \t]+\d+|{word}(?:[ \t]+{word}){{0,3}})",
        titles = title_alternation(),
        word = word,
    )
}

fn timestamp_suffix() -> &'static str {
    r"[ \t]*\((?P<ts>\d{1,2}:\d{2}(?::\d{2})?)\)[ \t]*:"
}

static TIMESTAMPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b{}{}", label_body(), timestamp_suffix()))
        .expect("invalid timestamped marker regex")
});

static SPEAKER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^[ \t]*{}[ \t]*:", label_body()))
        .expect("invalid speaker-only marker regex")
});

static LEADING_TIMESTAMPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{}{}", label_body(), timestamp_suffix()))
        .expect("invalid leading timestamped marker regex")
});

static LEADING_SPEAKER_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{}[ \t]*:", label_body()))
        .expect("invalid leading speaker-only marker regex")
});

fn marker_from_captures(caps: &Captures<'_>, kind: MarkerKind) -> Option<SpeakerMarker> {
    let whole = caps.get(0)?;
    let name_match = caps.name("name")?;
    let title = caps.name("title");

    let (skipped, name) = trim_leading_stop_words(name_match.as_str());
    // A title only belongs to the label when no words were trimmed between them
    let (start, title) = match title {
        Some(t) if skipped == 0 => (t.start(), Some(t.as_str().to_string())),
        _ => (name_match.start() + skipped, None),
    };

    Some(SpeakerMarker {
        start,
        end: whole.end(),
        title,
        name: name.to_string(),
        timestamp: caps.name("ts").map(|m| m.as_str().to_string()),
        kind,
    })
}

/// Find every `Name (mm:ss):` marker in the text, in order
pub fn find_timestamped_markers(text: &str) -> Vec<SpeakerMarker> {
    TIMESTAMPED
        .captures_iter(text)
        .filter_map(|caps| marker_from_captures(&caps, MarkerKind::Timestamped))
        .collect()
}

/// Find every line-initial `Name:` marker in the text, in order
pub fn find_speaker_only_markers(text: &str) -> Vec<SpeakerMarker> {
    SPEAKER_ONLY
        .captures_iter(text)
        .filter_map(|caps| marker_from_captures(&caps, MarkerKind::SpeakerOnly))
        .collect()
}

/// Find all markers of one family
pub fn find_markers(text: &str, kind: MarkerKind) -> Vec<SpeakerMarker> {
    match kind {
        MarkerKind::Timestamped => find_timestamped_markers(text),
        MarkerKind::SpeakerOnly => find_speaker_only_markers(text),
    }
}

/// The speaker label at the very start of `text`, trying the timestamped
/// form first
pub fn leading_marker(text: &str) -> Option<SpeakerMarker> {
    if let Some(caps) = LEADING_TIMESTAMPED.captures(text) {
        return marker_from_captures(&caps, MarkerKind::Timestamped);
    }
    LEADING_SPEAKER_ONLY
        .captures(text)
        .and_then(|caps| marker_from_captures(&caps, MarkerKind::SpeakerOnly))
}

/// Whether the text contains at least one timestamped marker anywhere
pub fn contains_timestamped_marker(text: &str) -> bool {
    TIMESTAMPED.is_match(text)
}

/// Decide whether normalized text is transcript-structured
pub fn detect_format(text: &str) -> FormatDetection {
    detect_format_with(text, MIN_SPEAKER_ONLY_MARKERS)
}

/// Format detection with an explicit speaker-only threshold
pub fn detect_format_with(text: &str, min_speaker_only: usize) -> FormatDetection {
    let rules = [
        FormatRule {
            kind: MarkerKind::Timestamped,
            min_count: 1,
        },
        FormatRule {
            kind: MarkerKind::SpeakerOnly,
            min_count: min_speaker_only.max(1),
        },
    ];

    let timestamped_markers = TIMESTAMPED.find_iter(text).count();
    let speaker_only_markers = SPEAKER_ONLY.find_iter(text).count();

    let matched_rule = rules
        .iter()
        .find(|rule| {
            let count = match rule.kind {
                MarkerKind::Timestamped => timestamped_markers,
                MarkerKind::SpeakerOnly => speaker_only_markers,
            };
            count >= rule.min_count
        })
        .map(|rule| rule.kind);

    FormatDetection {
        is_transcript: matched_rule.is_some(),
        timestamped_markers,
        speaker_only_markers,
        matched_rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamped_marker_with_title() {
        let markers = find_timestamped_markers("Dr. Jane Doe (01:23): Welcome back.");
        assert_eq!(markers.len(), 1);
        let m = &markers[0];
        assert_eq!(m.start, 0);
        assert_eq!(m.title.as_deref(), Some("Dr."));
        assert_eq!(m.name, "Jane Doe");
        assert_eq!(m.timestamp.as_deref(), Some("01:23"));
        assert_eq!(&"Dr. Jane Doe (01:23): Welcome back."[m.end..], " Welcome back.");
    }

    #[test]
    fn test_inline_markers_after_sentence() {
        let text = "Jane Doe (01:23): Hello. Jane Doe (01:45): …and welcome.";
        let markers = find_timestamped_markers(text);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1].name, "Jane Doe");
        assert_eq!(&text[markers[1].start..markers[1].start + 4], "Jane");
    }

    #[test]
    fn test_numbered_speaker_and_long_timestamp() {
        let markers = find_timestamped_markers("Speaker 2 (1:02:03): Yes.");
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "Speaker 2");
        assert_eq!(markers[0].timestamp.as_deref(), Some("1:02:03"));
    }

    #[test]
    fn test_leading_stop_word_is_not_part_of_name() {
        let text = "thanks. And Jane (00:10): sure";
        let markers = find_timestamped_markers(text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "Jane");
        assert_eq!(&text[markers[0].start..markers[0].end], "Jane (00:10):");
    }

    #[test]
    fn test_speaker_only_markers_are_line_anchored() {
        let text = "Alice: hi\nBob: hello\nsaid Carol: nope\n  Alice: again";
        let markers = find_speaker_only_markers(text);
        let names: Vec<_> = markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Alice"]);
    }

    #[test]
    fn test_detect_format_timestamped() {
        let detection = detect_format("Intro text.\nJane Doe (00:01): Hi there.");
        assert!(detection.is_transcript);
        assert_eq!(detection.matched_rule, Some(MarkerKind::Timestamped));
    }

    #[test]
    fn test_detect_format_requires_three_speaker_only_markers() {
        let two = "Chapter: One\nNote: this is prose.";
        assert!(!detect_format(two).is_transcript);

        let three = "Alice: hi\nBob: hello\nAlice: bye";
        let detection = detect_format(three);
        assert!(detection.is_transcript);
        assert_eq!(detection.matched_rule, Some(MarkerKind::SpeakerOnly));
    }

    #[test]
    fn test_lowercase_words_are_not_titles_or_names() {
        assert!(detect_format("the doctor (01:00): said").timestamped_markers == 0);
    }

    #[test]
    fn test_leading_marker() {
        let m = leading_marker("Senator Smith: I yield.").unwrap();
        assert_eq!(m.kind, MarkerKind::SpeakerOnly);
        assert_eq!(m.title.as_deref(), Some("Senator"));
        assert_eq!(m.name, "Smith");
        assert!(leading_marker("Nothing to see here").is_none());
    }

    #[test]
    fn test_speaker_key_folds_case_and_repeats() {
        let m = leading_marker("John John Smith Smith (00:05): ok").unwrap();
        assert_eq!(m.speaker_key(), "john smith");
    }
}

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::heuristics::{leading_marker, JunkFilter, LineClass, MarkerKind};
use crate::models::Paragraph;

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});")
        .expect("invalid entity regex")
});

static INAUDIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\[(]\s*(?:inaudible|unintelligible|crosstalk|indiscernible)[^\])\n]*[\])]")
        .expect("invalid inaudible regex")
});

/// Decode named and numeric HTML entities; unknown entities are left as is
pub fn decode_html_entities(text: &str) -> String {
    HTML_ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            let hex = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X"));
            let decoded = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = body.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "copy" => '©',
        _ => return None,
    };
    Some(c)
}

/// Remove `[inaudible 00:12]`-style markers, leaving the surrounding text
pub fn remove_inaudible_markers(text: &str) -> String {
    INAUDIBLE.replace_all(text, " ").into_owned()
}

/// Replace curly quotes with straight ones
pub fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '“' | '”' | '„' | '‟' => '"',
            '‘' | '’' | '‚' | '‛' => '\'',
            other => other,
        })
        .collect()
}

/// Whether paragraph cleaning drops this line.
///
/// Boilerplate always goes. Short lines go only when they carry no letters
/// or digits, so terse replies like "OK" survive.
fn is_droppable_line(filter: &JunkFilter, line: &str) -> bool {
    match filter.classify(line) {
        LineClass::Boilerplate(_) => true,
        LineClass::TooShort => !line.chars().any(char::is_alphanumeric),
        _ => false,
    }
}

/// Clean a segmented paragraph: strip boilerplate lines, decode entities,
/// remove inaudible markers, and collapse whitespace
pub fn clean_paragraph(raw: &str, filter: &JunkFilter) -> String {
    let kept: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_droppable_line(filter, line))
        .collect();

    let decoded = decode_html_entities(&kept.join(" "));
    let audible = remove_inaudible_markers(&decoded);
    audible.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a cleaned paragraph into display tokens.
///
/// A leading speaker label becomes a title token (if any) followed by a
/// single `Name:` head token. Speaker-only labels are recognized only when
/// `speaker_only_labels` is set.
pub fn tokenize(cleaned: &str, speaker_only_labels: bool) -> Vec<String> {
    tokenize_with_head(cleaned, speaker_only_labels).0
}

/// [`tokenize`], also returning the index of the emitted head token
pub fn tokenize_with_head(
    cleaned: &str,
    speaker_only_labels: bool,
) -> (Vec<String>, Option<usize>) {
    let text = straighten_quotes(cleaned);

    let marker = leading_marker(&text).filter(|m| match m.kind {
        MarkerKind::Timestamped => true,
        MarkerKind::SpeakerOnly => speaker_only_labels,
    });

    let Some(marker) = marker else {
        return (text.split_whitespace().map(str::to_string).collect(), None);
    };

    let mut tokens: Vec<String> = text[..marker.start]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if let Some(title) = &marker.title {
        tokens.push(title.clone());
    }
    let head = tokens.len();
    tokens.push(format!("{}:", marker.canonical_name()));
    tokens.extend(text[marker.end..].split_whitespace().map(str::to_string));
    (tokens, Some(head))
}

/// Perform Stage 2: clean and tokenize every segmented paragraph.
///
/// Paragraphs with no tokens after cleaning are dropped.
pub fn build_paragraphs(
    segments: &[String],
    filter: &JunkFilter,
    speaker_only_labels: bool,
) -> Vec<Paragraph> {
    let paragraphs: Vec<Paragraph> = segments
        .iter()
        .filter_map(|raw| {
            let cleaned = clean_paragraph(raw, filter);
            let (tokens, head) = tokenize_with_head(&cleaned, speaker_only_labels);
            if tokens.is_empty() {
                debug!("Dropping empty paragraph: {:?}", raw);
                None
            } else {
                Some(Paragraph::new(raw.as_str(), tokens).with_head(head))
            }
        })
        .collect();

    info!(
        "Stage 2: {} paragraphs tokenized ({} dropped)",
        paragraphs.len(),
        segments.len() - paragraphs.len()
    );

    paragraphs
}

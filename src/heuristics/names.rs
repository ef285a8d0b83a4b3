use std::sync::LazyLock;

use regex::Regex;

/// Short words that never become directory keys, and that are not
/// treated as the start of a speaker name.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "from", "he", "her", "his", "i", "if",
    "in", "is", "it", "my", "no", "not", "of", "oh", "ok", "okay", "on", "or", "our", "she",
    "so", "than", "that", "the", "then", "they", "this", "to", "uh", "um", "up", "we", "well",
    "with", "yes", "you", "your",
];

static NUMBERED_SPEAKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^speaker\s+(\d+)$").expect("invalid numbered speaker regex")
});

pub fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOP_WORDS.contains(&lower.as_str())
}

/// Drop leading stop words ("And Jane" -> "Jane"), keeping at least one word.
///
/// Returns the number of bytes skipped alongside the remaining name.
pub fn trim_leading_stop_words(name: &str) -> (usize, &str) {
    let mut offset = 0;
    let mut rest = name;

    loop {
        let Some(split) = rest.find(char::is_whitespace) else {
            break;
        };
        let (word, tail) = rest.split_at(split);
        if !is_stop_word(word) {
            break;
        }
        let trimmed = tail.trim_start();
        offset += rest.len() - trimmed.len();
        rest = trimmed;
    }

    (offset, rest)
}

fn phrase_eq(a: &[&str], b: &[&str]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.to_lowercase() == y.to_lowercase())
}

/// Collapse a word or phrase that is immediately repeated, as produced by
/// garbled pastes: "John John Smith Smith" -> "John Smith",
/// "Jane Doe Jane Doe" -> "Jane Doe".
pub fn dedupe_name(name: &str) -> String {
    let mut words: Vec<&str> = name.split_whitespace().collect();

    'scan: loop {
        for len in 1..=words.len() / 2 {
            for start in 0..=words.len() - 2 * len {
                if phrase_eq(&words[start..start + len], &words[start + len..start + 2 * len]) {
                    words.drain(start + len..start + 2 * len);
                    continue 'scan;
                }
            }
        }
        break;
    }

    words.join(" ")
}

/// Dedupe a full label such as `"John John Smith Smith:"`, keeping the colon
pub fn dedupe_label(label: &str) -> String {
    let trimmed = label.trim();
    match trimmed.strip_suffix(':') {
        Some(name) => format!("{}:", dedupe_name(name)),
        None => dedupe_name(trimmed),
    }
}

/// The number in a "Speaker N" name
pub fn speaker_number(name: &str) -> Option<&str> {
    NUMBERED_SPEAKER
        .captures(name.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Directory keys derived from a canonical name.
///
/// "Speaker N" yields `["Speaker N", "N"]`; a one-word name yields itself;
/// longer names yield first, last, and "first last". Stop words are never
/// returned as single-word keys.
pub fn key_variants(canonical: &str) -> Vec<String> {
    if let Some(number) = speaker_number(canonical) {
        return vec![format!("Speaker {}", number), number.to_string()];
    }

    let words: Vec<&str> = canonical.split_whitespace().collect();
    let mut keys = Vec::new();

    match words.as_slice() {
        [] => {}
        [only] => {
            if !is_stop_word(only) {
                keys.push(only.to_string());
            }
        }
        [first, .., last] => {
            if !is_stop_word(first) {
                keys.push(first.to_string());
            }
            if !is_stop_word(last) {
                keys.push(last.to_string());
            }
            keys.push(format!("{} {}", first, last));
        }
    }

    keys
}

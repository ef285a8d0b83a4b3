use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::markers::contains_timestamped_marker;

/// Category of a boilerplate catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoilerplateKind {
    Navigation,
    Subscription,
    Legal,
    Social,
    Advertising,
    Media,
}

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    /// Contains a timestamped speaker marker; always kept
    SpeakerMarker,
    /// Fewer characters than the minimum
    TooShort,
    /// Matches the boilerplate catalog
    Boilerplate(BoilerplateKind),
    /// Short, unpunctuated, and not capitalized
    Fragment,
    Content,
}

impl LineClass {
    pub fn is_junk(&self) -> bool {
        matches!(
            self,
            LineClass::TooShort | LineClass::Boilerplate(_) | LineClass::Fragment
        )
    }
}

static CATALOG: LazyLock<Vec<(Regex, BoilerplateKind)>> = LazyLock::new(|| {
    let table: &[(&str, BoilerplateKind)] = &[
        (
            r"^(home|menu|search|close|skip to( main)? content|back to top|next( page)?|previous( page)?|(main|toggle) navigation|sign in|log ?in|log ?out|sign up|register)$",
            BoilerplateKind::Navigation,
        ),
        (r"^home\s*[|>»/›]", BoilerplateKind::Navigation),
        (r"\s[|»›]\s.*\s[|»›]\s", BoilerplateKind::Navigation),
        (
            r"subscribe (to|for|now|today)|(sign up|subscribe) for (our|the|a) (free )?newsletter|already a subscriber|become a (member|subscriber)|create (a|your) free account|unlock (this|full|unlimited) (article|access|stories)",
            BoilerplateKind::Subscription,
        ),
        (
            r"all rights reserved|©|\(c\)\s*\d{4}|copyright\s+\d{4}|privacy policy|terms (of (use|service)|and conditions)|cookie (policy|settings|preferences)|we use cookies|do not sell my",
            BoilerplateKind::Legal,
        ),
        (
            r"^(share|tweet|pin|email|print)( this)?( (article|story|page|episode))?$|share (on|to) (facebook|twitter|x|linkedin|reddit)|follow us (on|at)",
            BoilerplateKind::Social,
        ),
        (
            r"^(facebook|twitter|instagram|linkedin|youtube|tiktok|reddit|whatsapp|threads|bluesky)$",
            BoilerplateKind::Social,
        ),
        (
            r"^(advertisement|sponsored( content)?|ad|promoted)$|story continues below",
            BoilerplateKind::Advertising,
        ),
        (
            r"^(click|tap) (here|to)\b|^transcript$|^(listen|watch)( now| to this (episode|article))?$|^related( articles| stories)?:?$|^read more$|^this transcript was (exported|generated)|^download (the )?(app|transcript|audio)",
            BoilerplateKind::Media,
        ),
    ];

    table
        .iter()
        .map(|(pattern, kind)| {
            let regex = Regex::new(&format!("(?i){}", pattern))
                .expect("invalid boilerplate regex");
            (regex, *kind)
        })
        .collect()
});

/// Line classifier for boilerplate, navigation and footer noise.
///
/// Rules are evaluated top to bottom; the first match decides.
#[derive(Debug, Clone)]
pub struct JunkFilter {
    /// Lines with fewer characters than this are junk
    pub min_length: usize,
    /// Unpunctuated lowercase lines shorter than this are junk
    pub fragment_length: usize,
}

impl Default for JunkFilter {
    fn default() -> Self {
        Self {
            min_length: 3,
            fragment_length: 10,
        }
    }
}

impl JunkFilter {
    pub fn new(min_length: usize, fragment_length: usize) -> Self {
        Self {
            min_length,
            fragment_length,
        }
    }

    pub fn classify(&self, line: &str) -> LineClass {
        let line = line.trim();

        if contains_timestamped_marker(line) {
            return LineClass::SpeakerMarker;
        }

        let len = line.chars().count();
        if len < self.min_length {
            return LineClass::TooShort;
        }

        if let Some(kind) = boilerplate_kind(line) {
            return LineClass::Boilerplate(kind);
        }

        let has_sentence_punct = line.contains(['.', '!', '?']);
        let starts_capital = line.chars().next().is_some_and(char::is_uppercase);
        if len < self.fragment_length && !has_sentence_punct && !starts_capital {
            return LineClass::Fragment;
        }

        LineClass::Content
    }

    pub fn is_junk(&self, line: &str) -> bool {
        self.classify(line).is_junk()
    }
}

/// First catalog category matching the line, if any
pub fn boilerplate_kind(line: &str) -> Option<BoilerplateKind> {
    let line = line.trim();
    CATALOG
        .iter()
        .find(|(regex, _)| regex.is_match(line))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lines_are_junk() {
        let filter = JunkFilter::default();
        assert_eq!(filter.classify("|"), LineClass::TooShort);
        assert_eq!(filter.classify("  »  "), LineClass::TooShort);
    }

    #[test]
    fn test_catalog_categories() {
        let filter = JunkFilter::default();
        assert_eq!(
            filter.classify("Subscribe to our newsletter for more"),
            LineClass::Boilerplate(BoilerplateKind::Subscription)
        );
        assert_eq!(
            filter.classify("© 2024 Example Media. All rights reserved."),
            LineClass::Boilerplate(BoilerplateKind::Legal)
        );
        assert_eq!(
            filter.classify("Skip to main content"),
            LineClass::Boilerplate(BoilerplateKind::Navigation)
        );
        assert_eq!(
            filter.classify("Twitter"),
            LineClass::Boilerplate(BoilerplateKind::Social)
        );
        assert_eq!(
            filter.classify("Advertisement"),
            LineClass::Boilerplate(BoilerplateKind::Advertising)
        );
    }

    #[test]
    fn test_fragments() {
        let filter = JunkFilter::default();
        assert_eq!(filter.classify("menu item"), LineClass::Fragment);
        assert_eq!(filter.classify("Heading"), LineClass::Content);
        assert_eq!(filter.classify("ok then."), LineClass::Content);
    }

    #[test]
    fn test_markers_are_always_kept() {
        let filter = JunkFilter::default();
        let line = "Jane Doe (00:01): Subscribe to our newsletter";
        assert_eq!(filter.classify(line), LineClass::SpeakerMarker);
        assert!(!filter.is_junk(line));
    }

    #[test]
    fn test_prose_is_content() {
        let filter = JunkFilter::default();
        assert!(!filter.is_junk("The committee met on Tuesday to discuss the budget."));
    }
}

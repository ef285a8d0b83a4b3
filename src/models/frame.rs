use serde::{Deserialize, Serialize};

/// One reading unit: the text to display and how many tokens it consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderFrame {
    pub display_text: String,
    /// 1 for a single token, 2 for a merged two-word name
    pub advance: usize,
}

impl ReaderFrame {
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            display_text: text.into(),
            advance: 1,
        }
    }

    pub fn merged(first: &str, second: &str) -> Self {
        Self {
            display_text: format!("{} {}", first, second),
            advance: 2,
        }
    }

    pub fn is_merged(&self) -> bool {
        self.advance == 2
    }
}

/// A frame's display text split at its pivot character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotParts {
    pub left: String,
    /// Exactly one character, or empty for empty input
    pub pivot: String,
    pub right: String,
}

impl PivotParts {
    /// Reassembled display text
    pub fn text(&self) -> String {
        format!("{}{}{}", self.left, self.pivot, self.right)
    }
}

/// Words of the active paragraph around the current frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphContext {
    pub before: Vec<String>,
    pub active: Vec<String>,
    pub after: Vec<String>,
}

/// Position counters, one-based for display; zero when empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub token: usize,
    pub total_tokens: usize,
    pub paragraph: usize,
    pub total_paragraphs: usize,
}

impl Progress {
    /// Fraction of tokens read, 0.0 to 1.0
    pub fn fraction(&self) -> f64 {
        if self.total_tokens == 0 {
            return 0.0;
        }
        self.token as f64 / self.total_tokens as f64
    }
}

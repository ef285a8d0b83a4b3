use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A paragraph of cleaned text and its display tokens.
///
/// When the paragraph opened with a recognized speaker label, `head` is the
/// index of the `Name:` token the tokenizer emitted for it (after an
/// optional title token).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph text as segmented, before cleaning
    pub raw_text: String,
    /// Ordered, non-empty, whitespace-trimmed tokens
    pub tokens: Vec<String>,
    #[serde(default)]
    pub head: Option<usize>,
}

impl Paragraph {
    pub fn new(raw_text: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            tokens,
            head: None,
        }
    }

    /// Mark the speaker head token; out-of-range indices are ignored
    pub fn with_head(mut self, head: Option<usize>) -> Self {
        self.head = head.filter(|&i| i < self.tokens.len());
        self
    }

    /// Number of tokens in this paragraph
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Index of the speaker head token, if the paragraph opens with one
    pub fn head_index(&self) -> Option<usize> {
        self.head
    }

    /// The speaker label text without its colon, e.g. `Jane Doe`
    pub fn head_label(&self) -> Option<&str> {
        self.head
            .and_then(|i| self.tokens.get(i))
            .and_then(|t| t.strip_suffix(':'))
    }
}

/// Location of a token inside the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPosition {
    pub paragraph: usize,
    pub local: usize,
}

/// Paragraphs plus the cumulative token offsets used for global addressing.
///
/// Global index `g` lives in the paragraph `p` with
/// `starts[p] <= g < starts[p] + paragraphs[p].token_count()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedDocument {
    pub paragraphs: Vec<Paragraph>,
    starts: Vec<usize>,
    total: usize,
}

impl TokenizedDocument {
    /// Build from paragraphs; paragraphs without tokens are dropped
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        let paragraphs: Vec<Paragraph> = paragraphs
            .into_iter()
            .filter(|p| !p.tokens.is_empty())
            .collect();

        let mut starts = Vec::with_capacity(paragraphs.len());
        let mut total = 0;
        for paragraph in &paragraphs {
            starts.push(total);
            total += paragraph.token_count();
        }

        Self {
            paragraphs,
            starts,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Length of the flattened token stream
    pub fn total_tokens(&self) -> usize {
        self.total
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Clamp a global index to `0..total`; `None` when there are no tokens
    pub fn clamp_index(&self, global: usize) -> Option<usize> {
        if self.total == 0 {
            None
        } else {
            Some(global.min(self.total - 1))
        }
    }

    /// Paragraph and local index of a global index, clamped into range
    pub fn locate(&self, global: usize) -> Option<TokenPosition> {
        let global = self.clamp_index(global)?;
        // Last paragraph whose start is <= global
        let paragraph = self.starts.partition_point(|&s| s <= global) - 1;
        Some(TokenPosition {
            paragraph,
            local: global - self.starts[paragraph],
        })
    }

    /// Global index of a paragraph-local position
    pub fn global_index(&self, position: TokenPosition) -> usize {
        self.starts.get(position.paragraph).copied().unwrap_or(self.total) + position.local
    }

    /// Global index of the first token of a paragraph, clamped to the last paragraph
    pub fn paragraph_start(&self, paragraph: usize) -> usize {
        if self.starts.is_empty() {
            return 0;
        }
        self.starts[paragraph.min(self.starts.len() - 1)]
    }

    /// Global index range of a paragraph's tokens
    pub fn paragraph_range(&self, paragraph: usize) -> Range<usize> {
        match self.paragraphs.get(paragraph) {
            Some(p) => {
                let start = self.starts[paragraph];
                start..start + p.token_count()
            }
            None => self.total..self.total,
        }
    }

    /// Token text at a global index
    pub fn token(&self, global: usize) -> Option<&str> {
        if global >= self.total {
            return None;
        }
        let position = self.locate(global)?;
        self.paragraphs[position.paragraph]
            .tokens
            .get(position.local)
            .map(String::as_str)
    }

    /// Iterate over the flattened token stream in global order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .flat_map(|p| p.tokens.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(tokens: &[&str]) -> Paragraph {
        Paragraph::new(tokens.join(" "), tokens.iter().map(|t| t.to_string()).collect())
    }

    #[test]
    fn test_token_count_conservation() {
        let doc = TokenizedDocument::new(vec![
            para(&["a", "b"]),
            para(&[]),
            para(&["c", "d", "e"]),
        ]);

        assert_eq!(doc.paragraph_count(), 2);
        let sum: usize = doc.paragraphs.iter().map(|p| p.token_count()).sum();
        assert_eq!(sum, doc.total_tokens());
        assert_eq!(doc.tokens().count(), doc.total_tokens());
    }

    #[test]
    fn test_locate_and_global_index() {
        let doc = TokenizedDocument::new(vec![para(&["a", "b"]), para(&["c", "d", "e"])]);

        let pos = doc.locate(3).unwrap();
        assert_eq!(pos, TokenPosition { paragraph: 1, local: 1 });
        assert_eq!(doc.global_index(pos), 3);
        assert_eq!(doc.token(3), Some("d"));
        assert_eq!(doc.paragraph_range(1), 2..5);

        // Out of range clamps to the last token
        assert_eq!(doc.locate(99), Some(TokenPosition { paragraph: 1, local: 2 }));
        assert_eq!(doc.token(99), None);
    }

    #[test]
    fn test_empty_document() {
        let doc = TokenizedDocument::new(vec![]);
        assert!(doc.is_empty());
        assert_eq!(doc.locate(0), None);
        assert_eq!(doc.paragraph_start(4), 0);
    }

    #[test]
    fn test_head_tokens() {
        let p = para(&["Dr.", "Jane Doe:", "Hello."]).with_head(Some(1));
        assert_eq!(p.head_index(), Some(1));
        assert_eq!(p.head_label(), Some("Jane Doe"));

        // A colon-terminated word is not a head unless it was marked as one
        let heading = para(&["Note:", "read", "this."]);
        assert_eq!(heading.head_index(), None);
        assert_eq!(heading.head_label(), None);

        let stale = para(&["one"]).with_head(Some(3));
        assert_eq!(stale.head_index(), None);
    }
}

use crate::heuristics::is_title_word;
use crate::models::{
    DocumentSnapshot, Paragraph, ReaderFrame, SpeakerDirectory, TokenPosition, TokenizedDocument,
};

/// Resolves global token indices into reading frames, folding a two-word
/// speaker name into a single frame
#[derive(Debug, Clone, Copy)]
pub struct FrameResolver<'a> {
    document: &'a TokenizedDocument,
    directory: &'a SpeakerDirectory,
}

/// Token with surrounding punctuation removed
fn bare(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphanumeric())
}

impl<'a> FrameResolver<'a> {
    pub fn new(snapshot: &'a DocumentSnapshot) -> Self {
        Self::from_parts(&snapshot.document, &snapshot.directory)
    }

    pub fn from_parts(document: &'a TokenizedDocument, directory: &'a SpeakerDirectory) -> Self {
        Self {
            document,
            directory,
        }
    }

    /// Frame starting at a paragraph-local index
    pub fn frame_in_paragraph(&self, paragraph: &Paragraph, local: usize) -> Option<ReaderFrame> {
        let current = paragraph.tokens.get(local)?;

        if let Some(next) = paragraph.tokens.get(local + 1) {
            if self.merges(current, next) {
                return Some(ReaderFrame::merged(current, next));
            }
        }

        Some(ReaderFrame::single(current.as_str()))
    }

    fn merges(&self, current: &str, next: &str) -> bool {
        let (a, b) = (bare(current), bare(next));
        if a.is_empty() || b.is_empty() || is_title_word(a) || is_title_word(b) {
            return false;
        }
        self.directory.contains_key(&format!("{} {}", a, b))
    }

    /// Frame at a global index, clamped into range; `None` for an empty document
    pub fn frame_at(&self, global: usize) -> Option<ReaderFrame> {
        let position = self.document.locate(global)?;
        let paragraph = &self.document.paragraphs[position.paragraph];
        self.frame_in_paragraph(paragraph, position.local)
    }

    /// Token count of the frame at a global index (1 for an empty document)
    pub fn advance_at(&self, global: usize) -> usize {
        self.frame_at(global).map_or(1, |f| f.advance)
    }

    /// Every frame of the document in reading order, with its global start
    pub fn frames(&self) -> Vec<(usize, ReaderFrame)> {
        let mut frames = Vec::new();
        for (index, paragraph) in self.document.paragraphs.iter().enumerate() {
            let start = self.document.paragraph_start(index);
            let mut local = 0;
            while let Some(frame) = self.frame_in_paragraph(paragraph, local) {
                let advance = frame.advance;
                frames.push((start + local, frame));
                local += advance;
            }
        }
        frames
    }

    /// Global start of the frame that covers `global`, walking the
    /// paragraph's frames from its first token
    pub fn frame_start_containing(&self, global: usize) -> usize {
        let Some(position) = self.document.locate(global) else {
            return 0;
        };
        let paragraph = &self.document.paragraphs[position.paragraph];

        let mut local = 0;
        while let Some(frame) = self.frame_in_paragraph(paragraph, local) {
            if local + frame.advance > position.local {
                break;
            }
            local += frame.advance;
        }

        self.document.global_index(TokenPosition {
            paragraph: position.paragraph,
            local,
        })
    }

    /// Where one step back from `global` lands: the start of the frame
    /// holding the token before it
    pub fn previous_frame_start(&self, global: usize) -> usize {
        let Some(global) = self.document.clamp_index(global) else {
            return 0;
        };
        if global == 0 {
            return 0;
        }
        self.frame_start_containing(global - 1)
    }
}

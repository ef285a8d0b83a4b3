use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::heuristics::{is_stop_word, key_variants};

/// A registered short form and the canonical name it resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Key as first registered, original casing
    pub key: String,
    /// Full speaker name, no title, no timestamp
    pub canonical: String,
}

/// Outcome of registering a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A longer canonical name replaced the existing one
    Extended,
    /// The existing entry was kept
    Kept,
    /// The key is a stop word or empty
    Rejected,
}

/// Lookup from name keys (first, last, "first last", "Speaker N", "N")
/// to canonical full names.
///
/// Keys are stored with their casing but looked up case-insensitively.
/// For a key seen with several candidates, the longest canonical name wins;
/// ties keep the existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerDirectory {
    entries: HashMap<String, DirectoryEntry>,
}

impl SpeakerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert-or-extend a single key
    pub fn insert(&mut self, key: &str, canonical: &str) -> InsertOutcome {
        let key = key.trim();
        let canonical = canonical.trim();
        if key.is_empty() || canonical.is_empty() || is_stop_word(key) {
            return InsertOutcome::Rejected;
        }

        let folded = key.to_lowercase();
        match self.entries.get_mut(&folded) {
            Some(existing) => {
                if canonical.chars().count() > existing.canonical.chars().count() {
                    existing.canonical = canonical.to_string();
                    InsertOutcome::Extended
                } else {
                    InsertOutcome::Kept
                }
            }
            None => {
                self.entries.insert(
                    folded,
                    DirectoryEntry {
                        key: key.to_string(),
                        canonical: canonical.to_string(),
                    },
                );
                InsertOutcome::Inserted
            }
        }
    }

    /// Register every key variant of a canonical name.
    ///
    /// Returns how many keys were inserted or extended.
    pub fn register_name(&mut self, canonical: &str) -> usize {
        key_variants(canonical)
            .iter()
            .map(|key| self.insert(key, canonical))
            .filter(|outcome| matches!(outcome, InsertOutcome::Inserted | InsertOutcome::Extended))
            .count()
    }

    /// Canonical name for a key, case-insensitive
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.trim().to_lowercase())
            .map(|e| e.canonical.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Entries sorted by key, for stable output
    pub fn entries(&self) -> Vec<&DirectoryEntry> {
        let mut entries: Vec<&DirectoryEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.key.to_lowercase().cmp(&b.key.to_lowercase()));
        entries
    }

    /// Distinct canonical names, sorted
    pub fn speakers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.values().map(|e| e.canonical.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

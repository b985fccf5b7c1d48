//! In-memory text cache: a peer's authoritative view of what it last knew
//! to be on disk at each tracked relative path.

use std::collections::HashMap;

use crate::checksum::{checksum, ChecksumIndex};

/// Path → text content. Owned exclusively by one peer's event loop; see
/// the crate-level invariants this stands in for in the sync engine.
#[derive(Debug, Default, Clone)]
pub struct TextCache {
    entries: HashMap<String, String>,
}

impl TextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the cached content at `path`.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(path.into(), content.into());
    }

    /// Current content at `path`, or `""` if the path isn't tracked.
    /// Mirrors `GetTextFile`'s "unknown path returns empty content" rule.
    pub fn get_or_empty(&self, path: &str) -> &str {
        self.entries.get(path).map(String::as_str).unwrap_or("")
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Removal is unused by the core — deletion is an explicit non-goal —
    /// but kept for completeness of the §4.6 operation list.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.entries.remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialize a checksum snapshot of the whole cache.
    pub fn checksum_index(&self) -> ChecksumIndex {
        self.entries
            .iter()
            .map(|(path, text)| (path.clone(), checksum(text)))
            .collect()
    }
}

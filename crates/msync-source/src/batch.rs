//! Pending-paths batch: the set of relative paths the watcher has seen
//! change since the last successful commit.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Batch {
    pending: HashSet<String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, path: impl Into<String>) {
        self.pending.insert(path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending path, leaving the batch empty.
    pub fn drain(&mut self) -> Vec<String> {
        self.pending.drain().collect()
    }

    /// Re-mark paths dirty after a failed commit attempt, so the next
    /// tick retries them.
    pub fn restore(&mut self, paths: impl IntoIterator<Item = String>) {
        self.pending.extend(paths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_batch() {
        let mut batch = Batch::new();
        batch.mark_dirty("a.txt");
        batch.mark_dirty("b.txt");
        let drained = batch.drain();
        assert_eq!(drained.len(), 2);
        assert!(batch.is_empty());
    }

    #[test]
    fn restore_after_failed_commit_requeues_paths() {
        let mut batch = Batch::new();
        batch.mark_dirty("a.txt");
        let drained = batch.drain();
        assert!(batch.is_empty());
        batch.restore(drained);
        assert!(!batch.is_empty());
    }

    #[test]
    fn marking_the_same_path_twice_coalesces() {
        let mut batch = Batch::new();
        batch.mark_dirty("a.txt");
        batch.mark_dirty("a.txt");
        assert_eq!(batch.drain().len(), 1);
    }
}

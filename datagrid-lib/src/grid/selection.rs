//! Selection state.
//!
//! Selection is tracked by row identifier rather than by row, so it survives
//! the grid replacing its row vectors on every recomputation or fetch.

use std::collections::HashSet;

/// ID-based selection set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: HashSet<String>,
}

impl Selection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected items.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Select or deselect one ID.
    /// Returns `true` if the selection changed.
    pub fn set(&mut self, id: &str, selected: bool) -> bool {
        if selected {
            self.selected.insert(id.to_string())
        } else {
            self.selected.remove(id)
        }
    }

    /// Keep only the IDs for which `keep` returns `true`.
    /// Returns the IDs that were dropped.
    pub fn retain(&mut self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        let mut dropped = Vec::new();
        self.selected.retain(|id| {
            let kept = keep(id);
            if !kept {
                dropped.push(id.clone());
            }
            kept
        });
        dropped.sort();
        dropped
    }

    /// Replace the selection with exactly `ids`.
    pub fn replace<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = ids.into_iter().map(Into::into).collect();
    }

    /// Clear all selection.
    /// Returns the IDs that were deselected.
    pub fn clear(&mut self) -> Vec<String> {
        self.selected.drain().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear() {
        let mut selection = Selection::new();
        assert!(selection.set("a", true));
        assert!(!selection.set("a", true));
        assert!(selection.set("b", true));
        assert_eq!(selection.selected(), vec!["a", "b"]);

        assert!(selection.set("a", false));
        assert!(!selection.is_selected("a"));

        let removed = selection.clear();
        assert_eq!(removed, vec!["b"]);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain() {
        let mut selection = Selection::new();
        selection.replace(["0-a", "1-b", "2-c"]);

        let dropped = selection.retain(|id| id != "1-b" && id != "2-c");
        assert_eq!(dropped, vec!["1-b", "2-c"]);
        assert_eq!(selection.selected(), vec!["0-a"]);
        assert!(selection.retain(|_| true).is_empty());
    }

    #[test]
    fn test_replace() {
        let mut selection = Selection::new();
        selection.set("old", true);
        selection.replace(["x", "y"]);
        assert_eq!(selection.selected(), vec!["x", "y"]);
        assert_eq!(selection.len(), 2);
    }
}

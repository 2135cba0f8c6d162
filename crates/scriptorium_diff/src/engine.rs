//! Greedy line diff between two code strings.

use crate::line::{DiffLine, DiffResult};

/// Engine for diffing two code strings
pub struct DiffEngine;

impl DiffEngine {
    /// Create a new diff engine (unit struct)
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Diff two texts line by line.
    ///
    /// This is a greedy, position-synchronized comparison: both cursors
    /// advance in lockstep, a mismatch emits one removed and one added
    /// line, and exhausted sides drain as pure adds or removes. It never
    /// re-synchronizes after an insertion shifts alignment, so a
    /// multi-line insertion reads as a run of paired modifications. That
    /// is the accepted tradeoff for O(max(n, m)) time with no
    /// backtracking; replacing it with an edit-distance algorithm would
    /// change rendered diffs for existing histories.
    #[must_use]
    pub fn diff(&self, original: &str, revised: &str) -> DiffResult {
        let original_lines: Vec<&str> = original.lines().collect();
        let revised_lines: Vec<&str> = revised.lines().collect();

        let mut lines = Vec::with_capacity(original_lines.len().max(revised_lines.len()));
        let max_len = original_lines.len().max(revised_lines.len());

        for i in 0..max_len {
            let original_line = original_lines.get(i);
            let revised_line = revised_lines.get(i);

            match (original_line, revised_line) {
                (Some(o), Some(r)) if o == r => {
                    lines.push(DiffLine::unchanged(i + 1, i + 1, *o));
                }
                (Some(o), Some(r)) => {
                    lines.push(DiffLine::removed(i + 1, *o));
                    lines.push(DiffLine::added(i + 1, *r));
                }
                (Some(o), None) => {
                    lines.push(DiffLine::removed(i + 1, *o));
                }
                (None, Some(r)) => {
                    lines.push(DiffLine::added(i + 1, *r));
                }
                (None, None) => {}
            }
        }

        DiffResult { lines }
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::DiffLineKind;

    use proptest::prelude::*;

    #[test]
    fn test_identical_inputs() {
        let engine = DiffEngine::new();
        let result = engine.diff("a\nb\nc", "a\nb\nc");

        assert!(result.is_identical());
        assert_eq!(result.lines.len(), 3);
        assert_eq!(result.summary().unchanged, 3);
    }

    #[test]
    fn test_substitution() {
        let engine = DiffEngine::new();
        let result = engine.diff("a\nb\nc", "a\nx\nc");

        let kinds: Vec<DiffLineKind> = result.lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiffLineKind::Unchanged,
                DiffLineKind::Removed,
                DiffLineKind::Added,
                DiffLineKind::Unchanged,
            ]
        );
        assert_eq!(result.lines[1].text, "b");
        assert_eq!(result.lines[2].text, "x");
    }

    #[test]
    fn test_trailing_additions() {
        let engine = DiffEngine::new();
        let result = engine.diff("a", "a\nb\nc");

        let summary = result.summary();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.modified, 0);
        assert_eq!(result.lines[1].revised_line, Some(2));
        assert_eq!(result.lines[2].revised_line, Some(3));
    }

    #[test]
    fn test_trailing_removals() {
        let engine = DiffEngine::new();
        let result = engine.diff("a\nb\nc", "a");

        let summary = result.summary();
        assert_eq!(summary.added, 0);
        assert_eq!(summary.removed, 2);
    }

    #[test]
    fn test_empty_inputs() {
        let engine = DiffEngine::new();
        assert!(engine.diff("", "").lines.is_empty());

        let result = engine.diff("", "a\nb");
        assert_eq!(result.summary().added, 2);

        let result = engine.diff("a\nb", "");
        assert_eq!(result.summary().removed, 2);
    }

    #[test]
    fn test_no_realignment_after_insertion() {
        // An insertion at the top shifts every later line; the greedy walk
        // reports paired modifications rather than one add.
        let engine = DiffEngine::new();
        let result = engine.diff("a\nb", "new\na\nb");

        let summary = result.summary();
        assert_eq!(summary.added, 3);
        assert_eq!(summary.removed, 2);
        assert_eq!(summary.modified, 2);
    }

    proptest! {
        #[test]
        fn prop_self_diff_is_unchanged(text in "[a-z\\n]{1,64}") {
            let engine = DiffEngine::new();
            let result = engine.diff(&text, &text);
            prop_assert!(result.is_identical());
        }

        #[test]
        fn prop_reverse_swaps_added_removed(
            a in "[a-c\\n]{0,32}",
            b in "[a-c\\n]{0,32}"
        ) {
            let engine = DiffEngine::new();
            let forward = engine.diff(&a, &b);
            let backward = engine.diff(&b, &a);

            let mut forward_added: Vec<&str> = forward
                .lines
                .iter()
                .filter(|l| l.kind == DiffLineKind::Added)
                .map(|l| l.text.as_str())
                .collect();
            let mut backward_removed: Vec<&str> = backward
                .lines
                .iter()
                .filter(|l| l.kind == DiffLineKind::Removed)
                .map(|l| l.text.as_str())
                .collect();
            forward_added.sort_unstable();
            backward_removed.sort_unstable();
            prop_assert_eq!(forward_added, backward_removed);

            let fwd = forward.summary();
            let bwd = backward.summary();
            prop_assert_eq!(fwd.added, bwd.removed);
            prop_assert_eq!(fwd.removed, bwd.added);
            prop_assert_eq!(fwd.unchanged, bwd.unchanged);
        }
    }
}

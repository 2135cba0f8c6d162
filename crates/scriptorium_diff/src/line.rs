//! Diff value types.

use serde::{Deserialize, Serialize};

/// Kind of change a diff line represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffLineKind {
    /// Line present only in the revised text
    Added,
    /// Line present only in the original text
    Removed,
    /// Line present in both texts at the current cursors
    Unchanged,
}

/// One line of a diff, with its position in each input.
///
/// Line numbers are 1-based; `source_line` is absent for added lines and
/// `revised_line` is absent for removed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// Kind of change
    pub kind: DiffLineKind,
    /// Position in the original text
    pub source_line: Option<usize>,
    /// Position in the revised text
    pub revised_line: Option<usize>,
    /// Line content
    pub text: String,
}

impl DiffLine {
    /// A line only the revised text has
    #[must_use]
    pub fn added(revised_line: usize, text: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Added,
            source_line: None,
            revised_line: Some(revised_line),
            text: text.into(),
        }
    }

    /// A line only the original text has
    #[must_use]
    pub fn removed(source_line: usize, text: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Removed,
            source_line: Some(source_line),
            revised_line: None,
            text: text.into(),
        }
    }

    /// A line both texts share at the current cursors
    #[must_use]
    pub fn unchanged(source_line: usize, revised_line: usize, text: impl Into<String>) -> Self {
        Self {
            kind: DiffLineKind::Unchanged,
            source_line: Some(source_line),
            revised_line: Some(revised_line),
            text: text.into(),
        }
    }
}

/// Ordered sequence of diff lines, mirroring a left-to-right reading of
/// both inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Diff lines in reading order
    pub lines: Vec<DiffLine>,
}

impl DiffResult {
    /// Create an empty diff result
    #[must_use]
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Whether the two inputs were identical
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.lines
            .iter()
            .all(|l| l.kind == DiffLineKind::Unchanged)
    }

    /// Summary counts for this diff
    #[must_use]
    pub fn summary(&self) -> DiffSummary {
        let mut added = 0;
        let mut removed = 0;
        let mut unchanged = 0;
        for line in &self.lines {
            match line.kind {
                DiffLineKind::Added => added += 1,
                DiffLineKind::Removed => removed += 1,
                DiffLineKind::Unchanged => unchanged += 1,
            }
        }
        DiffSummary {
            added,
            removed,
            // Paired add/remove runs count once as a modification
            modified: added.min(removed),
            unchanged,
        }
    }
}

/// Summary of a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Number of lines added
    pub added: usize,
    /// Number of lines removed
    pub removed: usize,
    /// Number of lines modified, defined as `min(added, removed)`
    pub modified: usize,
    /// Number of lines unchanged
    pub unchanged: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_constructors() {
        let added = DiffLine::added(2, "x");
        assert_eq!(added.kind, DiffLineKind::Added);
        assert_eq!(added.source_line, None);
        assert_eq!(added.revised_line, Some(2));

        let removed = DiffLine::removed(2, "b");
        assert_eq!(removed.kind, DiffLineKind::Removed);
        assert_eq!(removed.revised_line, None);

        let unchanged = DiffLine::unchanged(1, 1, "a");
        assert_eq!(unchanged.source_line, Some(1));
        assert_eq!(unchanged.revised_line, Some(1));
    }

    #[test]
    fn test_summary_counts() {
        let result = DiffResult {
            lines: vec![
                DiffLine::unchanged(1, 1, "a"),
                DiffLine::removed(2, "b"),
                DiffLine::added(2, "x"),
                DiffLine::added(3, "y"),
            ],
        };
        let summary = result.summary();
        assert_eq!(summary.added, 2);
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.unchanged, 1);
    }

    #[test]
    fn test_is_identical() {
        let mut result = DiffResult::new();
        assert!(result.is_identical());

        result.lines.push(DiffLine::unchanged(1, 1, "a"));
        assert!(result.is_identical());

        result.lines.push(DiffLine::added(2, "b"));
        assert!(!result.is_identical());
    }

    #[test]
    fn test_serializes() {
        let result = DiffResult {
            lines: vec![DiffLine::removed(1, "gone")],
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: DiffResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}

//! Line-based diffs between two content strings.
//!
//! Diffing is pluggable through [`DiffStrategy`]. The default,
//! [`PositionalDiff`], compares lines index by index and never realigns
//! around insertions; [`LcsDiff`] realigns using a Myers diff.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fmt::Write as _;
use std::sync::Arc;

/// What happened to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffOpKind {
    Added,
    Removed,
    Unchanged,
}

/// One line of a diff. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    pub kind: DiffOpKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_line_number: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_line_number: Option<usize>,
}

impl DiffOp {
    /// A line present only in the new content.
    pub fn added(content: impl Into<String>, new_line_number: usize) -> Self {
        Self {
            kind: DiffOpKind::Added,
            content: content.into(),
            old_line_number: None,
            new_line_number: Some(new_line_number),
        }
    }

    /// A line present only in the old content.
    pub fn removed(content: impl Into<String>, old_line_number: usize) -> Self {
        Self {
            kind: DiffOpKind::Removed,
            content: content.into(),
            old_line_number: Some(old_line_number),
            new_line_number: None,
        }
    }

    /// A line present in both.
    pub fn unchanged(
        content: impl Into<String>,
        old_line_number: usize,
        new_line_number: usize,
    ) -> Self {
        Self {
            kind: DiffOpKind::Unchanged,
            content: content.into(),
            old_line_number: Some(old_line_number),
            new_line_number: Some(new_line_number),
        }
    }
}

/// Line counts for a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub lines_added: usize,
    pub lines_removed: usize,
    /// Always 0: a changed line is reported as a removal plus an addition.
    pub lines_modified: usize,
}

impl DiffSummary {
    /// Count the operations of a diff.
    pub fn from_ops(ops: &[DiffOp]) -> Self {
        ops.iter().fold(Self::default(), |mut summary, op| {
            match op.kind {
                DiffOpKind::Added => summary.lines_added += 1,
                DiffOpKind::Removed => summary.lines_removed += 1,
                DiffOpKind::Unchanged => {}
            }
            summary
        })
    }

    /// Whether the diff contains any change at all.
    pub fn is_empty(&self) -> bool {
        self.lines_added == 0 && self.lines_removed == 0 && self.lines_modified == 0
    }
}

/// A line diff algorithm.
pub trait DiffStrategy: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Diff `old` against `new`, line by line.
    fn diff(&self, old: &str, new: &str) -> Vec<DiffOp>;
}

/// Index-by-index line comparison.
///
/// Lines at the same position are compared; a differing pair yields a
/// removal followed by an addition. An insertion near the top therefore
/// shows every following line as changed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalDiff;

impl DiffStrategy for PositionalDiff {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn diff(&self, old: &str, new: &str) -> Vec<DiffOp> {
        let old_lines: Vec<&str> = old.split('\n').collect();
        let new_lines: Vec<&str> = new.split('\n').collect();
        let max_len = old_lines.len().max(new_lines.len());

        let mut ops = Vec::with_capacity(max_len);
        for i in 0..max_len {
            let line_number = i + 1;
            match (old_lines.get(i), new_lines.get(i)) {
                (None, Some(new_line)) => ops.push(DiffOp::added(*new_line, line_number)),
                (Some(old_line), None) => ops.push(DiffOp::removed(*old_line, line_number)),
                (Some(old_line), Some(new_line)) if old_line != new_line => {
                    ops.push(DiffOp::removed(*old_line, line_number));
                    ops.push(DiffOp::added(*new_line, line_number));
                }
                (Some(old_line), Some(_)) => {
                    ops.push(DiffOp::unchanged(*old_line, line_number, line_number))
                }
                (None, None) => {}
            }
        }
        ops
    }
}

/// Realigning line diff (Myers) built on `similar`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LcsDiff;

impl DiffStrategy for LcsDiff {
    fn name(&self) -> &'static str {
        "lcs"
    }

    fn diff(&self, old: &str, new: &str) -> Vec<DiffOp> {
        let old_lines: Vec<&str> = old.split('\n').collect();
        let new_lines: Vec<&str> = new.split('\n').collect();
        let diff = TextDiff::from_slices(&old_lines, &new_lines);

        diff.iter_all_changes()
            .map(|change| {
                let kind = match change.tag() {
                    ChangeTag::Insert => DiffOpKind::Added,
                    ChangeTag::Delete => DiffOpKind::Removed,
                    ChangeTag::Equal => DiffOpKind::Unchanged,
                };
                DiffOp {
                    kind,
                    content: change.value().to_string(),
                    old_line_number: change.old_index().map(|i| i + 1),
                    new_line_number: change.new_index().map(|i| i + 1),
                }
            })
            .collect()
    }
}

/// Selectable diff algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    #[default]
    Positional,
    Lcs,
}

impl DiffAlgorithm {
    /// Build the strategy for this algorithm.
    pub fn strategy(self) -> Arc<dyn DiffStrategy> {
        match self {
            DiffAlgorithm::Positional => Arc::new(PositionalDiff),
            DiffAlgorithm::Lcs => Arc::new(LcsDiff),
        }
    }
}

/// Diff two contents with the default positional strategy.
pub fn generate_diff(old: &str, new: &str) -> Vec<DiffOp> {
    PositionalDiff.diff(old, new)
}

/// Render a diff as `+`/`-`/` ` prefixed lines.
pub fn render(ops: &[DiffOp]) -> String {
    let mut output = String::new();
    for op in ops {
        let sign = match op.kind {
            DiffOpKind::Added => '+',
            DiffOpKind::Removed => '-',
            DiffOpKind::Unchanged => ' ',
        };
        let _ = writeln!(output, "{sign}{}", op.content);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(ops: &[DiffOp]) -> Vec<DiffOpKind> {
        ops.iter().map(|op| op.kind).collect()
    }

    #[test]
    fn test_positional_single_line_change() {
        let ops = generate_diff("a\nb\nc", "a\nx\nc");
        assert_eq!(
            ops,
            vec![
                DiffOp::unchanged("a", 1, 1),
                DiffOp::removed("b", 2),
                DiffOp::added("x", 2),
                DiffOp::unchanged("c", 3, 3),
            ]
        );

        let summary = DiffSummary::from_ops(&ops);
        assert_eq!(summary.lines_added, 1);
        assert_eq!(summary.lines_removed, 1);
        assert_eq!(summary.lines_modified, 0);
    }

    #[test]
    fn test_positional_appended_and_truncated_lines() {
        let ops = generate_diff("a", "a\nb\nc");
        assert_eq!(
            kinds(&ops),
            vec![DiffOpKind::Unchanged, DiffOpKind::Added, DiffOpKind::Added]
        );

        let ops = generate_diff("a\nb\nc", "a");
        assert_eq!(
            kinds(&ops),
            vec![DiffOpKind::Unchanged, DiffOpKind::Removed, DiffOpKind::Removed]
        );
        assert_eq!(ops[2].old_line_number, Some(3));
        assert_eq!(ops[2].new_line_number, None);
    }

    #[test]
    fn test_positional_does_not_realign() {
        // Inserting a line at the top shifts everything.
        let ops = generate_diff("b\nc", "a\nb\nc");
        let summary = DiffSummary::from_ops(&ops);
        assert_eq!(summary.lines_added, 3);
        assert_eq!(summary.lines_removed, 2);
    }

    #[test]
    fn test_identical_content_is_all_unchanged() {
        let ops = generate_diff("same\ntext", "same\ntext");
        assert!(DiffSummary::from_ops(&ops).is_empty());
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn test_empty_contents() {
        // "" splits into one empty line, so both sides have a single line.
        assert_eq!(generate_diff("", ""), vec![DiffOp::unchanged("", 1, 1)]);
        assert_eq!(
            kinds(&generate_diff("", "x")),
            vec![DiffOpKind::Removed, DiffOpKind::Added]
        );
    }

    #[test]
    fn test_lcs_realigns_insertion() {
        let ops = LcsDiff.diff("b\nc", "a\nb\nc");
        assert_eq!(
            ops,
            vec![
                DiffOp::added("a", 1),
                DiffOp::unchanged("b", 1, 2),
                DiffOp::unchanged("c", 2, 3),
            ]
        );
    }

    #[test]
    fn test_lcs_single_line_change_matches_positional_counts() {
        let summary = DiffSummary::from_ops(&LcsDiff.diff("a\nb\nc", "a\nx\nc"));
        assert_eq!(summary.lines_added, 1);
        assert_eq!(summary.lines_removed, 1);
    }

    #[test]
    fn test_algorithm_selects_strategy() {
        assert_eq!(DiffAlgorithm::default().strategy().name(), "positional");
        assert_eq!(DiffAlgorithm::Lcs.strategy().name(), "lcs");
    }

    #[test]
    fn test_render() {
        let rendered = render(&generate_diff("a\nb", "a\nc"));
        assert_eq!(rendered, " a\n-b\n+c\n");
    }

    #[test]
    fn test_diff_op_serialization_omits_missing_line_numbers() {
        let json = serde_json::to_value(DiffOp::added("x", 4)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "added", "content": "x", "new_line_number": 4})
        );
    }
}

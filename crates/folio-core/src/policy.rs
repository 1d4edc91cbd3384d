//! Auto-snapshot heuristics and change summaries.

use serde::{Deserialize, Serialize};

/// Decides when an edit is large enough to snapshot automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotPolicy {
    /// Line delta that always triggers a snapshot when exceeded.
    pub min_line_delta: usize,

    /// Line delta, as a fraction of the old line count, that triggers a snapshot when exceeded.
    pub line_delta_ratio: f64,

    /// Character delta that triggers a snapshot when exceeded.
    pub char_delta_threshold: usize,
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            min_line_delta: 1,
            line_delta_ratio: 0.10,
            char_delta_threshold: 100,
        }
    }
}

impl SnapshotPolicy {
    /// Whether the change from `old` to `new` warrants a snapshot.
    ///
    /// Absent or empty content on either side always does.
    pub fn should_auto_snapshot(&self, old: Option<&str>, new: Option<&str>) -> bool {
        let (Some(old), Some(new)) = (non_empty(old), non_empty(new)) else {
            return true;
        };

        let old_lines = line_count(old);
        let line_delta = old_lines.abs_diff(line_count(new));
        let line_threshold =
            (self.min_line_delta as f64).max(self.line_delta_ratio * old_lines as f64);
        if line_delta as f64 > line_threshold {
            return true;
        }

        char_count(old).abs_diff(char_count(new)) > self.char_delta_threshold
    }

    /// Describe the change from `old` to `new`, e.g. `"+12 lines, +340 chars"`.
    pub fn summarize(&self, old: Option<&str>, new: Option<&str>) -> String {
        let Some(old) = non_empty(old) else {
            return "Initial content".to_string();
        };
        let Some(new) = non_empty(new) else {
            return "Content cleared".to_string();
        };

        let line_delta = line_count(new) as i64 - line_count(old) as i64;
        let char_delta = char_count(new) as i64 - char_count(old) as i64;

        let mut parts = Vec::with_capacity(2);
        if line_delta != 0 {
            parts.push(format!("{line_delta:+} lines"));
        }
        if char_delta != 0 {
            parts.push(format!("{char_delta:+} chars"));
        }

        if parts.is_empty() {
            "Content modified".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn non_empty(content: Option<&str>) -> Option<&str> {
    content.filter(|c| !c.is_empty())
}

fn line_count(content: &str) -> usize {
    content.split('\n').count()
}

fn char_count(content: &str) -> usize {
    content.chars().count()
}

//! Version data structures.

use crate::diff::{DiffOp, DiffSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a version was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    /// Created by the save path because an edit crossed the snapshot policy.
    #[default]
    AutoSnapshot,
    /// Explicitly requested by a user.
    ManualSnapshot,
    /// Pre-restore state captured by a restore.
    RestoreBackup,
    /// Marks the content a document was restored to.
    RestoreRecord,
}

impl VersionKind {
    /// Manual and restore-related versions count as snapshots.
    pub fn is_snapshot(self) -> bool {
        !matches!(self, VersionKind::AutoSnapshot)
    }

    /// Versions written by a restore.
    pub fn is_restore_point(self) -> bool {
        matches!(self, VersionKind::RestoreBackup | VersionKind::RestoreRecord)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VersionKind::AutoSnapshot => "auto",
            VersionKind::ManualSnapshot => "manual",
            VersionKind::RestoreBackup => "restore-backup",
            VersionKind::RestoreRecord => "restore",
        }
    }
}

impl std::fmt::Display for VersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// An immutable full-content snapshot of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Store identity (`ver_<ulid>`).
    pub id: String,

    /// Owning document.
    pub document_id: String,

    /// Per-document sequence number, starting at 1.
    pub version_number: u64,

    /// Full text of the document at this point.
    pub content: String,

    /// Digest of `content`, the dedup key within one document.
    pub content_hash: String,

    pub created_by: String,
    pub created_by_name: String,

    /// Short human-readable description of the change.
    pub changes_summary: String,

    /// Provenance of this version.
    #[serde(default)]
    pub kind: VersionKind,

    /// Mirrors `kind.is_snapshot()`; stored so history can be filtered by the store.
    pub is_snapshot: bool,

    pub created_at: DateTime<Utc>,
}

impl Version {
    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Who is creating a snapshot and how it should be labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotMeta {
    pub created_by: String,
    pub created_by_name: String,
    /// Defaults to `"Document updated"`.
    pub changes_summary: Option<String>,
    pub kind: VersionKind,
}

impl SnapshotMeta {
    /// Metadata for an auto-snapshot by the given actor.
    pub fn new(created_by: impl Into<String>, created_by_name: impl Into<String>) -> Self {
        Self {
            created_by: created_by.into(),
            created_by_name: created_by_name.into(),
            changes_summary: None,
            kind: VersionKind::AutoSnapshot,
        }
    }

    /// Metadata for a manual snapshot by the given actor.
    pub fn manual(created_by: impl Into<String>, created_by_name: impl Into<String>) -> Self {
        Self::new(created_by, created_by_name).with_kind(VersionKind::ManualSnapshot)
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.changes_summary = Some(summary.into());
        self
    }

    pub fn with_kind(mut self, kind: VersionKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Paging and filtering for history queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Page size; the configured default when `None`, clamped to the configured maximum.
    pub limit: Option<usize>,
    pub offset: usize,
    /// Only return manual and restore-related versions.
    pub snapshots_only: bool,
}

impl HistoryOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn snapshots_only(mut self) -> Self {
        self.snapshots_only = true;
        self
    }
}

/// Result of comparing two versions.
#[derive(Debug, Clone, Serialize)]
pub struct VersionComparison {
    pub version1: Version,
    pub version2: Version,
    pub diff: Vec<DiffOp>,
    pub summary: DiffSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_snapshot_flags() {
        assert!(!VersionKind::AutoSnapshot.is_snapshot());
        assert!(VersionKind::ManualSnapshot.is_snapshot());
        assert!(VersionKind::RestoreBackup.is_snapshot());
        assert!(VersionKind::RestoreRecord.is_snapshot());

        assert!(!VersionKind::ManualSnapshot.is_restore_point());
        assert!(VersionKind::RestoreBackup.is_restore_point());
    }

    #[test]
    fn test_kind_display_pads() {
        assert_eq!(format!("{:<8}|", VersionKind::ManualSnapshot), "manual  |");
        assert_eq!(VersionKind::RestoreRecord.to_string(), "restore");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(VersionKind::RestoreBackup).unwrap();
        assert_eq!(json, serde_json::json!("restore_backup"));
    }

    #[test]
    fn test_snapshot_meta_builders() {
        let meta = SnapshotMeta::manual("u1", "Ada").with_summary("Checkpoint");
        assert_eq!(meta.kind, VersionKind::ManualSnapshot);
        assert_eq!(meta.changes_summary.as_deref(), Some("Checkpoint"));

        let meta = SnapshotMeta::new("u1", "Ada");
        assert_eq!(meta.kind, VersionKind::AutoSnapshot);
        assert!(meta.changes_summary.is_none());
    }

    #[test]
    fn test_history_options_builder() {
        let options = HistoryOptions::default().limit(10).offset(5).snapshots_only();
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.offset, 5);
        assert!(options.snapshots_only);
    }
}

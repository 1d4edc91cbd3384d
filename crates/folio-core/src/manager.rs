//! Version manager: snapshot creation, history, comparison and restore.

use crate::config::{FolioConfig, HistoryConfig};
use crate::diff::{DiffAlgorithm, DiffStrategy, DiffSummary};
use crate::document::{Document, DocumentService, DocumentUpdate};
use crate::error::{VersionError, VersionResult};
use crate::hash::hash_content;
use crate::lock::DocumentLocks;
use crate::policy::SnapshotPolicy;
use crate::version::{HistoryOptions, SnapshotMeta, Version, VersionComparison, VersionKind};
use chrono::Utc;
use folio_store::{Query, RecordStore, StoreError};
use folio_util::{IdPrefix, Identifier};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collection holding versions in a record store.
pub const VERSIONS_COLLECTION: &str = "versions";

/// Summary used when a snapshot is created without one.
pub const DEFAULT_CHANGES_SUMMARY: &str = "Document updated";

/// Creates, reads, compares and restores document versions.
///
/// Writes to one document are serialized through an in-process lock table,
/// so dedup and numbering hold for every writer sharing this manager.
pub struct VersionManager {
    store: Arc<dyn RecordStore>,
    documents: Arc<dyn DocumentService>,
    policy: SnapshotPolicy,
    diff: Arc<dyn DiffStrategy>,
    history: HistoryConfig,
    locks: DocumentLocks,
}

impl VersionManager {
    /// Create a manager with default policy, diff strategy and history limits.
    pub fn new(store: Arc<dyn RecordStore>, documents: Arc<dyn DocumentService>) -> Self {
        Self {
            store,
            documents,
            policy: SnapshotPolicy::default(),
            diff: DiffAlgorithm::default().strategy(),
            history: HistoryConfig::default(),
            locks: DocumentLocks::new(),
        }
    }

    /// Create a manager configured from `config`.
    pub fn from_config(
        store: Arc<dyn RecordStore>,
        documents: Arc<dyn DocumentService>,
        config: &FolioConfig,
    ) -> Self {
        Self::new(store, documents)
            .with_policy(config.policy.clone())
            .with_diff_strategy(config.diff.strategy())
            .with_history(config.history.clone())
    }

    pub fn with_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_diff_strategy(mut self, diff: Arc<dyn DiffStrategy>) -> Self {
        self.diff = diff;
        self
    }

    pub fn with_history(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    pub fn policy(&self) -> &SnapshotPolicy {
        &self.policy
    }

    /// Name of the active diff strategy.
    pub fn diff_strategy(&self) -> &'static str {
        self.diff.name()
    }

    /// Create a snapshot of `content`, or return the existing version
    /// with identical content.
    ///
    /// Duplicates consume no version number.
    pub async fn create_snapshot(
        &self,
        document_id: &str,
        content: &str,
        meta: SnapshotMeta,
    ) -> VersionResult<Version> {
        require("document_id", document_id)?;
        require("content", content)?;
        require("created_by", &meta.created_by)?;
        require("created_by_name", &meta.created_by_name)?;

        let content_hash = hash_content(content);

        let _guard = self.locks.acquire(document_id).await;

        if let Some(existing) = self.find_by_hash(document_id, &content_hash).await? {
            debug!(
                document_id,
                version_id = %existing.id,
                version_number = existing.version_number,
                "Content unchanged, reusing version"
            );
            return Ok(existing);
        }

        self.insert_version(document_id, content, content_hash, meta).await
    }

    /// Newest version of a document, if any.
    pub async fn latest_version(&self, document_id: &str) -> VersionResult<Option<Version>> {
        let mut versions =
            list_versions(self.store.as_ref(), document_id, Some(1), 0, false).await?;
        Ok(versions.pop())
    }

    /// Versions of a document, newest first.
    pub async fn get_version_history(
        &self,
        document_id: &str,
        options: HistoryOptions,
    ) -> VersionResult<Vec<Version>> {
        require("document_id", document_id)?;

        let limit = self.history.effective_limit(options.limit);
        list_versions(
            self.store.as_ref(),
            document_id,
            Some(limit),
            options.offset,
            options.snapshots_only,
        )
        .await
    }

    /// Fetch a single version with its content.
    pub async fn get_version_content(&self, version_id: &str) -> VersionResult<Version> {
        require("version_id", version_id)?;
        if !Identifier::has_prefix(version_id, IdPrefix::Version) {
            return Err(VersionError::not_found(format!("version {version_id}")));
        }

        let record = self
            .store
            .get_record(VERSIONS_COLLECTION, version_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => {
                    VersionError::not_found(format!("version {version_id}"))
                }
                other => other.into(),
            })?;
        Ok(serde_json::from_value(record)?)
    }

    /// Diff two versions, `version_id1` as the old side.
    pub async fn compare_versions(
        &self,
        version_id1: &str,
        version_id2: &str,
    ) -> VersionResult<VersionComparison> {
        let version1 = self.get_version_content(version_id1).await?;
        let version2 = self.get_version_content(version_id2).await?;

        let diff = self.diff.diff(&version1.content, &version2.content);
        let summary = DiffSummary::from_ops(&diff);

        Ok(VersionComparison {
            version1,
            version2,
            diff,
            summary,
        })
    }

    /// Restore a document to the content of one of its versions.
    ///
    /// Writes a backup of the live content, updates the document, then
    /// writes a version recording the restore. Both versions are always
    /// inserted, even when their content matches an existing version.
    /// If the document update fails the live document is untouched; the
    /// backup remains.
    pub async fn restore_version(
        &self,
        document_id: &str,
        version_id: &str,
        restored_by: &str,
        restored_by_name: &str,
    ) -> VersionResult<Document> {
        require("document_id", document_id)?;
        require("restored_by", restored_by)?;
        require("restored_by_name", restored_by_name)?;

        let target = self.get_version_content(version_id).await?;
        if target.document_id != document_id {
            return Err(VersionError::Mismatch {
                version_id: version_id.to_string(),
                document_id: document_id.to_string(),
            });
        }

        let _guard = self.locks.acquire(document_id).await;

        let live = self.documents.get_document(document_id).await?;

        let backup_meta = SnapshotMeta::new(restored_by, restored_by_name)
            .with_kind(VersionKind::RestoreBackup)
            .with_summary(format!(
                "Backup before restoring to version {}",
                target.version_number
            ));
        let backup = self
            .insert_version(
                document_id,
                &live.content,
                hash_content(&live.content),
                backup_meta,
            )
            .await?;

        let updated = self
            .documents
            .update_document(
                document_id,
                DocumentUpdate::content(target.content.clone()),
                restored_by,
                restored_by_name,
            )
            .await?;

        let record_meta = SnapshotMeta::new(restored_by, restored_by_name)
            .with_kind(VersionKind::RestoreRecord)
            .with_summary(format!(
                "Restored to version {} ({})",
                target.version_number, target.changes_summary
            ));
        let record = self
            .insert_version(
                document_id,
                &target.content,
                target.content_hash.clone(),
                record_meta,
            )
            .await?;

        info!(
            document_id,
            target_version = target.version_number,
            backup_version = backup.version_number,
            restore_version = record.version_number,
            "Restored document"
        );

        Ok(updated)
    }

    /// Snapshot an edit if the policy considers it significant.
    ///
    /// Never fails: errors are logged and yield `None`.
    pub async fn create_auto_snapshot(
        &self,
        document_id: &str,
        old_content: Option<&str>,
        new_content: &str,
        user_id: &str,
        user_name: &str,
    ) -> Option<Version> {
        if !self
            .policy
            .should_auto_snapshot(old_content, Some(new_content))
        {
            debug!(document_id, "Change below snapshot threshold");
            return None;
        }

        let summary = self.policy.summarize(old_content, Some(new_content));
        let meta = SnapshotMeta::new(user_id, user_name).with_summary(summary);

        match self.create_snapshot(document_id, new_content, meta).await {
            Ok(version) => Some(version),
            Err(e) => {
                warn!(document_id, "Auto-snapshot failed: {}", e);
                None
            }
        }
    }

    /// Earliest version of a document with the given content.
    async fn find_by_hash(
        &self,
        document_id: &str,
        content_hash: &str,
    ) -> VersionResult<Option<Version>> {
        let query = Query::new()
            .filter("document_id", json!(document_id))
            .filter("content_hash", json!(content_hash))
            .order_by_asc("version_number")
            .limit(1);
        let mut records = self.store.query(VERSIONS_COLLECTION, &query).await?;
        match records.pop() {
            Some(record) => Ok(Some(serde_json::from_value(record)?)),
            None => Ok(None),
        }
    }

    async fn next_version_number(&self, document_id: &str) -> VersionResult<u64> {
        Ok(self
            .latest_version(document_id)
            .await?
            .map_or(1, |latest| latest.version_number + 1))
    }

    /// Insert a new version. The caller holds the document lock.
    async fn insert_version(
        &self,
        document_id: &str,
        content: &str,
        content_hash: String,
        meta: SnapshotMeta,
    ) -> VersionResult<Version> {
        let version = Version {
            id: Identifier::version(),
            document_id: document_id.to_string(),
            version_number: self.next_version_number(document_id).await?,
            content: content.to_string(),
            content_hash,
            created_by: meta.created_by,
            created_by_name: meta.created_by_name,
            changes_summary: meta
                .changes_summary
                .unwrap_or_else(|| DEFAULT_CHANGES_SUMMARY.to_string()),
            kind: meta.kind,
            is_snapshot: meta.kind.is_snapshot(),
            created_at: Utc::now(),
        };

        self.store
            .create_record(VERSIONS_COLLECTION, serde_json::to_value(&version)?)
            .await?;

        info!(
            document_id,
            version_id = %version.id,
            version_number = version.version_number,
            kind = %version.kind,
            "Created version"
        );

        Ok(version)
    }
}

/// Versions of a document ordered by `version_number` descending.
pub(crate) async fn list_versions(
    store: &dyn RecordStore,
    document_id: &str,
    limit: Option<usize>,
    offset: usize,
    snapshots_only: bool,
) -> VersionResult<Vec<Version>> {
    let mut query = Query::new()
        .filter("document_id", json!(document_id))
        .order_by_desc("version_number")
        .offset(offset);
    if snapshots_only {
        query = query.filter("is_snapshot", json!(true));
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    store
        .query(VERSIONS_COLLECTION, &query)
        .await?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(VersionError::from))
        .collect()
}

fn require(name: &str, value: &str) -> VersionResult<()> {
    if value.is_empty() {
        return Err(VersionError::invalid_argument(format!("{name} is required")));
    }
    Ok(())
}

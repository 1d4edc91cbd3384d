//! Pruning of old versions.

use crate::error::VersionResult;
use crate::manager::{list_versions, VERSIONS_COLLECTION};
use crate::version::Version;
use folio_store::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which versions survive a cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionOptions {
    /// Number of most recent versions always kept.
    pub keep_recent_count: usize,

    /// Keep manual and restore-related versions beyond the recent window.
    pub keep_all_snapshots: bool,

    /// Opt-in: keep restore backups and restore records even when
    /// `keep_all_snapshots` is off.
    pub keep_restore_points: bool,
}

impl Default for RetentionOptions {
    fn default() -> Self {
        Self {
            keep_recent_count: 50,
            keep_all_snapshots: true,
            keep_restore_points: false,
        }
    }
}

impl RetentionOptions {
    pub fn keep_recent(mut self, count: usize) -> Self {
        self.keep_recent_count = count;
        self
    }

    pub fn keep_all_snapshots(mut self, keep: bool) -> Self {
        self.keep_all_snapshots = keep;
        self
    }

    pub fn keep_restore_points(mut self, keep: bool) -> Self {
        self.keep_restore_points = keep;
        self
    }

    /// Whether a version outside the recent window must be kept.
    pub fn is_protected(&self, version: &Version) -> bool {
        (self.keep_all_snapshots && version.is_snapshot)
            || (self.keep_restore_points && version.kind.is_restore_point())
    }
}

/// Deletes versions that fall outside a retention window.
///
/// Only deletes; never rewrites a version, so it can run alongside
/// snapshot creation and history reads.
pub struct RetentionManager {
    store: Arc<dyn RecordStore>,
    defaults: RetentionOptions,
}

impl RetentionManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            defaults: RetentionOptions::default(),
        }
    }

    /// Use `defaults` for [`cleanup`](Self::cleanup).
    pub fn with_defaults(mut self, defaults: RetentionOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &RetentionOptions {
        &self.defaults
    }

    /// Clean up a document with the configured defaults.
    pub async fn cleanup(&self, document_id: &str) -> VersionResult<usize> {
        self.cleanup_old_versions(document_id, &self.defaults).await
    }

    /// Delete versions of `document_id` beyond the `keep_recent_count` newest,
    /// skipping protected ones.
    ///
    /// Individual deletion failures are logged and skipped. Returns the
    /// number of versions actually deleted.
    pub async fn cleanup_old_versions(
        &self,
        document_id: &str,
        options: &RetentionOptions,
    ) -> VersionResult<usize> {
        let versions = list_versions(self.store.as_ref(), document_id, None, 0, false).await?;

        if versions.len() <= options.keep_recent_count {
            debug!(
                document_id,
                total = versions.len(),
                keep = options.keep_recent_count,
                "Nothing to prune"
            );
            return Ok(0);
        }

        let mut deleted = 0;
        for version in versions.iter().skip(options.keep_recent_count) {
            if options.is_protected(version) {
                continue;
            }

            match self
                .store
                .delete_record(VERSIONS_COLLECTION, &version.id)
                .await
            {
                Ok(()) => deleted += 1,
                Err(e) => warn!(
                    document_id,
                    version_id = %version.id,
                    version_number = version.version_number,
                    "Failed to delete version: {}",
                    e
                ),
            }
        }

        if deleted > 0 {
            info!(document_id, deleted, "Pruned old versions");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::StoreDocumentService;
    use crate::manager::VersionManager;
    use crate::version::{SnapshotMeta, VersionKind};
    use async_trait::async_trait;
    use folio_store::{MemoryStore, Query, StoreError, StoreResult};
    use serde_json::Value;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Delegates to a memory store but refuses to delete selected ids.
    struct FlakyStore {
        inner: MemoryStore,
        failing: Mutex<HashSet<String>>,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                failing: Mutex::new(HashSet::new()),
            }
        }

        fn fail_delete(&self, id: &str) {
            self.failing.lock().unwrap().insert(id.to_string());
        }
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn create_record(&self, collection: &str, data: Value) -> StoreResult<Value> {
            self.inner.create_record(collection, data).await
        }

        async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
            self.inner.query(collection, query).await
        }

        async fn get_record(&self, collection: &str, id: &str) -> StoreResult<Value> {
            self.inner.get_record(collection, id).await
        }

        async fn update_record(
            &self,
            collection: &str,
            id: &str,
            patch: Value,
        ) -> StoreResult<Value> {
            self.inner.update_record(collection, id, patch).await
        }

        async fn delete_record(&self, collection: &str, id: &str) -> StoreResult<()> {
            if self.failing.lock().unwrap().contains(id) {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "simulated failure",
                )));
            }
            self.inner.delete_record(collection, id).await
        }
    }

    async fn seed(store: Arc<dyn RecordStore>, kinds: &[VersionKind]) -> Vec<Version> {
        let documents = Arc::new(StoreDocumentService::new(Arc::clone(&store)));
        let manager = VersionManager::new(store, documents);
        let mut versions = Vec::new();
        for (i, kind) in kinds.iter().enumerate() {
            let meta = SnapshotMeta::new("u1", "Ada").with_kind(*kind);
            versions.push(
                manager
                    .create_snapshot("doc_1", &format!("content {i}"), meta)
                    .await
                    .unwrap(),
            );
        }
        versions
    }

    async fn remaining_numbers(store: &dyn RecordStore) -> Vec<u64> {
        list_versions(store, "doc_1", None, 0, false)
            .await
            .unwrap()
            .iter()
            .map(|v| v.version_number)
            .collect()
    }

    #[tokio::test]
    async fn test_cleanup_deletes_beyond_window() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(Arc::clone(&store), &[VersionKind::AutoSnapshot; 5]).await;

        let retention = RetentionManager::new(Arc::clone(&store));
        let deleted = retention
            .cleanup_old_versions("doc_1", &RetentionOptions::default().keep_recent(2))
            .await
            .unwrap();

        assert_eq!(deleted, 3);
        assert_eq!(remaining_numbers(store.as_ref()).await, vec![5, 4]);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_snapshots() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(
            Arc::clone(&store),
            &[
                VersionKind::AutoSnapshot,
                VersionKind::ManualSnapshot,
                VersionKind::AutoSnapshot,
                VersionKind::AutoSnapshot,
                VersionKind::AutoSnapshot,
            ],
        )
        .await;

        let retention = RetentionManager::new(Arc::clone(&store));
        let deleted = retention
            .cleanup_old_versions("doc_1", &RetentionOptions::default().keep_recent(2))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(remaining_numbers(store.as_ref()).await, vec![5, 4, 2]);
    }

    #[tokio::test]
    async fn test_cleanup_without_snapshot_protection() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(
            Arc::clone(&store),
            &[
                VersionKind::ManualSnapshot,
                VersionKind::RestoreBackup,
                VersionKind::AutoSnapshot,
                VersionKind::AutoSnapshot,
            ],
        )
        .await;

        let retention = RetentionManager::new(Arc::clone(&store));
        let options = RetentionOptions::default()
            .keep_recent(2)
            .keep_all_snapshots(false);
        assert_eq!(retention.cleanup_old_versions("doc_1", &options).await.unwrap(), 2);
        assert_eq!(remaining_numbers(store.as_ref()).await, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_cleanup_prunes_restore_entries_without_snapshot_protection() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(
            Arc::clone(&store),
            &[
                VersionKind::RestoreBackup,
                VersionKind::RestoreRecord,
                VersionKind::AutoSnapshot,
                VersionKind::AutoSnapshot,
                VersionKind::AutoSnapshot,
            ],
        )
        .await;

        let retention = RetentionManager::new(Arc::clone(&store));
        let options = RetentionOptions {
            keep_recent_count: 2,
            keep_all_snapshots: false,
            ..RetentionOptions::default()
        };
        assert!(!options.keep_restore_points);
        assert_eq!(retention.cleanup_old_versions("doc_1", &options).await.unwrap(), 3);
        assert_eq!(remaining_numbers(store.as_ref()).await, vec![5, 4]);
    }

    #[tokio::test]
    async fn test_cleanup_keep_restore_points_opt_in() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(
            Arc::clone(&store),
            &[
                VersionKind::ManualSnapshot,
                VersionKind::RestoreBackup,
                VersionKind::AutoSnapshot,
                VersionKind::AutoSnapshot,
            ],
        )
        .await;

        let retention = RetentionManager::new(Arc::clone(&store));
        let options = RetentionOptions::default()
            .keep_recent(2)
            .keep_all_snapshots(false)
            .keep_restore_points(true);
        assert_eq!(retention.cleanup_old_versions("doc_1", &options).await.unwrap(), 1);
        assert_eq!(remaining_numbers(store.as_ref()).await, vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn test_cleanup_within_window_is_noop() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(Arc::clone(&store), &[VersionKind::AutoSnapshot; 3]).await;

        let retention = RetentionManager::new(Arc::clone(&store))
            .with_defaults(RetentionOptions::default().keep_recent(3));
        assert_eq!(retention.cleanup("doc_1").await.unwrap(), 0);
        assert_eq!(retention.cleanup("doc_unknown").await.unwrap(), 0);
        assert_eq!(remaining_numbers(store.as_ref()).await.len(), 3);
    }

    #[tokio::test]
    async fn test_cleanup_continues_past_failed_delete() {
        let flaky = Arc::new(FlakyStore::new());
        let store: Arc<dyn RecordStore> = flaky.clone();
        let versions = seed(Arc::clone(&store), &[VersionKind::AutoSnapshot; 5]).await;

        // Versions are seeded oldest first; make version 2 undeletable.
        flaky.fail_delete(&versions[1].id);

        let retention = RetentionManager::new(Arc::clone(&store));
        let deleted = retention
            .cleanup_old_versions("doc_1", &RetentionOptions::default().keep_recent(2))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(remaining_numbers(store.as_ref()).await, vec![5, 4, 2]);
    }

    #[tokio::test]
    async fn test_cleanup_only_touches_one_document() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        seed(Arc::clone(&store), &[VersionKind::AutoSnapshot; 3]).await;

        let documents = Arc::new(StoreDocumentService::new(Arc::clone(&store)));
        let manager = VersionManager::new(Arc::clone(&store), documents);
        for i in 0..3 {
            manager
                .create_snapshot("doc_2", &format!("other {i}"), SnapshotMeta::new("u1", "Ada"))
                .await
                .unwrap();
        }

        let retention = RetentionManager::new(Arc::clone(&store));
        let deleted = retention
            .cleanup_old_versions("doc_1", &RetentionOptions::default().keep_recent(1))
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(list_versions(store.as_ref(), "doc_2", None, 0, false).await.unwrap().len(), 3);
    }
}

//! Per-document write serialization.
//!
//! Snapshot dedup reads the store and then inserts; two writers racing on
//! the same document could both miss the duplicate and both allocate the
//! same version number. Writers take the document's lock for that span.
//! Only writers sharing one [`DocumentLocks`] are serialized.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async lock table keyed by document id.
#[derive(Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a document. Released on drop.
    pub async fn acquire(&self, document_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries only referenced by the table are idle.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(document_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of documents with a held or awaited lock.
    #[cfg(test)]
    async fn active(&self) -> usize {
        self.locks
            .lock()
            .await
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

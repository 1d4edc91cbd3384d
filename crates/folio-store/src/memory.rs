//! In-memory record store implementation for testing.

use crate::{
    merge_patch, prepare_record, validate_component, Query, RecordStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

type Collections = HashMap<String, BTreeMap<String, String>>;

/// In-memory record store.
///
/// Records are kept as serialized JSON so callers never share mutable
/// state with the store. Nothing is persisted.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    read_only: AtomicBool,
}

impl MemoryStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            read_only: AtomicBool::new(false),
        }
    }

    /// Toggle read-only mode. While enabled every write fails with
    /// [`StoreError::PermissionDenied`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of records in a collection.
    pub fn len(&self, collection: &str) -> StoreResult<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(collections.get(collection).map_or(0, BTreeMap::len))
    }

    fn check_writable(&self, collection: &str) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::permission_denied(format!(
                "store is read-only, cannot write to {collection}"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_record(&self, collection: &str, data: Value) -> StoreResult<Value> {
        validate_component(collection)?;
        self.check_writable(collection)?;
        let (id, object) = prepare_record(data)?;
        let record = Value::Object(object);
        let json = serde_json::to_string(&record)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let records = collections.entry(collection.to_string()).or_default();
        if records.contains_key(&id) {
            return Err(StoreError::AlreadyExists(format!("{collection}/{id}")));
        }
        records.insert(id, json);

        Ok(record)
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        let Some(records) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let parsed = records
            .values()
            .map(|json| serde_json::from_str::<Value>(json))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(query.apply(parsed))
    }

    async fn get_record(&self, collection: &str, id: &str) -> StoreResult<Value> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        match collections.get(collection).and_then(|r| r.get(id)) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    async fn update_record(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Value> {
        self.check_writable(collection)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        let slot = collections
            .get_mut(collection)
            .and_then(|r| r.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        let mut record: Value = serde_json::from_str(slot)?;
        merge_patch(&mut record, patch)?;
        *slot = serde_json::to_string(&record)?;

        Ok(record)
    }

    async fn delete_record(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.check_writable(collection)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        collections
            .get_mut(collection)
            .and_then(|r| r.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }
}

//! JSON file-based record store.
//!
//! Each record is stored as a separate JSON file:
//! `("versions", "ver_123")` -> `<base>/versions/ver_123.json`

use crate::{
    merge_patch, prepare_record, validate_component, Query, RecordStore, StoreError, StoreResult,
};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// JSON file-based record store.
#[derive(Clone)]
pub struct JsonStore {
    base_path: PathBuf,
    read_only: bool,
}

impl JsonStore {
    /// Create a new JSON store rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            read_only: false,
        }
    }

    /// Open a store that rejects every write with
    /// [`StoreError::PermissionDenied`].
    pub fn read_only(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            read_only: true,
        }
    }

    fn collection_dir(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_component(collection)?;
        Ok(self.base_path.join(collection))
    }

    fn record_path(&self, collection: &str, id: &str) -> StoreResult<PathBuf> {
        validate_component(id)?;
        let mut path = self.collection_dir(collection)?;
        path.push(format!("{id}.json"));
        Ok(path)
    }

    fn check_writable(&self, collection: &str) -> StoreResult<()> {
        if self.read_only {
            return Err(StoreError::permission_denied(format!(
                "store at {} is read-only, cannot write to {collection}",
                self.base_path.display()
            )));
        }
        Ok(())
    }

    /// Write atomically (write to temp file, then rename).
    async fn write_record(&self, path: &Path, record: &Value) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::from_io(e, &parent.display().to_string()))?;
        }

        let content = serde_json::to_string_pretty(record)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .await
            .map_err(|e| StoreError::from_io(e, &temp_path.display().to_string()))?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| StoreError::from_io(e, &path.display().to_string()))?;
        Ok(())
    }

    async fn read_record(&self, collection: &str, id: &str) -> StoreResult<Value> {
        let path = self.record_path(collection, id)?;
        debug!(path = %path.display(), "Reading record");

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(collection, id))
            }
            Err(e) => Err(StoreError::from_io(e, &path.display().to_string())),
        }
    }
}

#[async_trait]
impl RecordStore for JsonStore {
    async fn create_record(&self, collection: &str, data: Value) -> StoreResult<Value> {
        self.check_writable(collection)?;
        let (id, object) = prepare_record(data)?;
        let path = self.record_path(collection, &id)?;
        debug!(path = %path.display(), "Creating record");

        if fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StoreError::AlreadyExists(format!("{collection}/{id}")));
        }

        let record = Value::Object(object);
        self.write_record(&path, &record).await?;
        Ok(record)
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let dir = self.collection_dir(collection)?;
        debug!(path = %dir.display(), "Querying collection");

        let mut records = Vec::new();
        match fs::read_dir(&dir).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();

                    // Only include .json files; skips in-flight temp files
                    if !path.extension().is_some_and(|ext| ext == "json") {
                        continue;
                    }
                    let content = match fs::read_to_string(&path).await {
                        Ok(content) => content,
                        // Deleted since the directory was listed.
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                        Err(e) => return Err(StoreError::from_io(e, &path.display().to_string())),
                    };
                    records.push(serde_json::from_str::<Value>(&content)?);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::from_io(e, &dir.display().to_string())),
        }

        Ok(query.apply(records))
    }

    async fn get_record(&self, collection: &str, id: &str) -> StoreResult<Value> {
        self.read_record(collection, id).await
    }

    async fn update_record(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Value> {
        self.check_writable(collection)?;
        let mut record = self.read_record(collection, id).await?;
        merge_patch(&mut record, patch)?;

        let path = self.record_path(collection, id)?;
        self.write_record(&path, &record).await?;
        Ok(record)
    }

    async fn delete_record(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.check_writable(collection)?;
        let path = self.record_path(collection, id)?;
        debug!(path = %path.display(), "Deleting record");

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::not_found(collection, id))
            }
            Err(e) => Err(StoreError::from_io(e, &path.display().to_string())),
        }
    }
}

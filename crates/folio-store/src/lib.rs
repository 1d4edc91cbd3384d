//! Record store layer for folio.
//!
//! Records are JSON objects grouped into named collections, each carrying a
//! string `id` field. Two backends are provided:
//! - JSON file store (one file per record)
//! - In-memory store (for testing)

pub mod error;
pub mod json;
pub mod memory;
pub mod query;

pub use error::{StoreError, StoreResult};
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use query::{Direction, Filter, OrderBy, Query};

use async_trait::async_trait;
use folio_util::Identifier;
use serde_json::{Map, Value};

/// Name of the field holding a record's identity.
pub const ID_FIELD: &str = "id";

/// A generic document/record store.
///
/// Collections are flat: a record is addressed by `(collection, id)`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record and return it as stored.
    ///
    /// An `id` is generated when `data` does not carry one.
    async fn create_record(&self, collection: &str, data: Value) -> StoreResult<Value>;

    /// Run a query against a collection.
    ///
    /// A collection that does not exist yet is empty.
    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Fetch one record.
    ///
    /// Fails with [`StoreError::NotFound`] if absent.
    async fn get_record(&self, collection: &str, id: &str) -> StoreResult<Value>;

    /// Shallow-merge `patch` into an existing record and return the result.
    async fn update_record(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Value>;

    /// Delete one record.
    ///
    /// Fails with [`StoreError::NotFound`] if absent.
    async fn delete_record(&self, collection: &str, id: &str) -> StoreResult<()>;
}

/// Validate a collection name or record id used as a storage key.
pub(crate) fn validate_component(component: &str) -> StoreResult<()> {
    if component.is_empty()
        || component.contains('/')
        || component.contains('\\')
        || component == "."
        || component == ".."
    {
        return Err(StoreError::invalid_key(format!(
            "Invalid key component: {:?}",
            component
        )));
    }
    Ok(())
}

/// Turn incoming data into a record object, assigning an id when missing.
pub(crate) fn prepare_record(data: Value) -> StoreResult<(String, Map<String, Value>)> {
    let Value::Object(mut object) = data else {
        return Err(StoreError::InvalidRecord(
            "record data must be a JSON object".to_string(),
        ));
    };

    let id = match object.get(ID_FIELD) {
        Some(Value::String(id)) => id.clone(),
        Some(other) => {
            return Err(StoreError::InvalidRecord(format!(
                "record id must be a string, got {other}"
            )))
        }
        None => {
            let id = Identifier::record();
            object.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
    };
    validate_component(&id)?;

    Ok((id, object))
}

/// Merge the top-level fields of `patch` into `record`. The id never changes.
pub(crate) fn merge_patch(record: &mut Value, patch: Value) -> StoreResult<()> {
    let Value::Object(patch) = patch else {
        return Err(StoreError::InvalidRecord(
            "patch must be a JSON object".to_string(),
        ));
    };
    let Value::Object(target) = record else {
        return Err(StoreError::InvalidRecord(
            "stored record is not a JSON object".to_string(),
        ));
    };

    for (key, value) in patch {
        if key != ID_FIELD {
            target.insert(key, value);
        }
    }
    Ok(())
}

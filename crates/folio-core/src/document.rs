//! Live documents and the service that owns them.
//!
//! The version engine never writes document content itself; it reads and
//! updates live content through [`DocumentService`].

use crate::error::{VersionError, VersionResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_store::RecordStore;
use folio_util::Identifier;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::info;

/// Collection holding documents in a record store.
pub const DOCUMENTS_COLLECTION: &str = "documents";

/// A collaboratively edited document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Current live text.
    pub content: String,
    pub updated_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_by_name: String,
}

/// Fields to change on a document. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl DocumentUpdate {
    /// An update that only replaces content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: Some(content.into()),
        }
    }
}

/// Owner of live document content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Fetch a document.
    async fn get_document(&self, document_id: &str) -> VersionResult<Document>;

    /// Apply an update on behalf of an editor and return the result.
    async fn update_document(
        &self,
        document_id: &str,
        update: DocumentUpdate,
        editor_id: &str,
        editor_name: &str,
    ) -> VersionResult<Document>;
}

/// [`DocumentService`] backed by the `documents` collection of a record store.
pub struct StoreDocumentService {
    store: Arc<dyn RecordStore>,
}

impl StoreDocumentService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create a new document.
    pub async fn create_document(
        &self,
        title: &str,
        content: &str,
        editor_id: &str,
        editor_name: &str,
    ) -> VersionResult<Document> {
        if title.is_empty() {
            return Err(VersionError::invalid_argument("title is required"));
        }

        let document = Document {
            id: Identifier::document(),
            title: title.to_string(),
            content: content.to_string(),
            updated_at: Utc::now(),
            updated_by: editor_id.to_string(),
            updated_by_name: editor_name.to_string(),
        };

        let record = self
            .store
            .create_record(DOCUMENTS_COLLECTION, serde_json::to_value(&document)?)
            .await?;
        info!(document_id = %document.id, "Created document");

        Ok(serde_json::from_value(record)?)
    }

    /// List all documents, most recently updated first.
    pub async fn list_documents(&self) -> VersionResult<Vec<Document>> {
        let query = folio_store::Query::new().order_by_desc("updated_at");
        let records = self.store.query(DOCUMENTS_COLLECTION, &query).await?;
        records
            .into_iter()
            .map(|r| serde_json::from_value(r).map_err(VersionError::from))
            .collect()
    }
}

#[async_trait]
impl DocumentService for StoreDocumentService {
    async fn get_document(&self, document_id: &str) -> VersionResult<Document> {
        let record = self
            .store
            .get_record(DOCUMENTS_COLLECTION, document_id)
            .await?;
        Ok(serde_json::from_value(record)?)
    }

    async fn update_document(
        &self,
        document_id: &str,
        update: DocumentUpdate,
        editor_id: &str,
        editor_name: &str,
    ) -> VersionResult<Document> {
        let mut patch = Map::new();
        if let Some(title) = update.title {
            patch.insert("title".to_string(), Value::String(title));
        }
        if let Some(content) = update.content {
            patch.insert("content".to_string(), Value::String(content));
        }
        patch.insert("updated_at".to_string(), json!(Utc::now()));
        patch.insert("updated_by".to_string(), json!(editor_id));
        patch.insert("updated_by_name".to_string(), json!(editor_name));

        let record = self
            .store
            .update_record(DOCUMENTS_COLLECTION, document_id, Value::Object(patch))
            .await?;
        Ok(serde_json::from_value(record)?)
    }
}

//! Document version control for folio.
//!
//! This crate provides versioning of collaboratively edited documents:
//! - Immutable full-content snapshots, deduplicated by content hash
//! - Automatic snapshots when an edit crosses a size threshold
//! - Line diffs between any two versions
//! - Restore to a prior version with a backup and a provenance record
//! - Retention cleanup that keeps recent and protected versions
//!
//! # Example
//!
//! ```no_run
//! use folio_core::{SnapshotMeta, StoreDocumentService, VersionManager};
//! use folio_store::{JsonStore, RecordStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn RecordStore> = Arc::new(JsonStore::new("/var/lib/folio"));
//! let documents = Arc::new(StoreDocumentService::new(store.clone()));
//! let manager = VersionManager::new(store, documents.clone());
//!
//! let doc = documents.create_document("Notes", "first draft", "u1", "Ada").await?;
//! let v1 = manager
//!     .create_snapshot(&doc.id, &doc.content, SnapshotMeta::manual("u1", "Ada"))
//!     .await?;
//!
//! // ... the document is edited ...
//!
//! // Roll back
//! manager.restore_version(&doc.id, &v1.id, "u1", "Ada").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod diff;
pub mod document;
mod error;
pub mod hash;
mod lock;
mod manager;
pub mod policy;
mod retention;
mod version;

pub use config::{ConfigError, FolioConfig, HistoryConfig};
pub use diff::{DiffAlgorithm, DiffOp, DiffOpKind, DiffStrategy, DiffSummary};
pub use document::{Document, DocumentService, DocumentUpdate, StoreDocumentService};
pub use error::{VersionError, VersionResult};
pub use hash::hash_content;
pub use lock::DocumentLocks;
pub use manager::{VersionManager, DEFAULT_CHANGES_SUMMARY, VERSIONS_COLLECTION};
pub use policy::SnapshotPolicy;
pub use retention::{RetentionManager, RetentionOptions};
pub use version::{HistoryOptions, SnapshotMeta, Version, VersionComparison, VersionKind};

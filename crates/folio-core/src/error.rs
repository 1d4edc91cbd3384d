//! Version engine error types.

use folio_store::StoreError;
use thiserror::Error;

/// Result type for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Errors surfaced by the version engine.
#[derive(Debug, Error)]
pub enum VersionError {
    /// A required argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Version or document not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store refused the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A version was used with a document it does not belong to.
    #[error("version {version_id} does not belong to document {document_id}")]
    Mismatch {
        version_id: String,
        document_id: String,
    },

    /// Backend failure; not retried here.
    #[error("store failure: {0}")]
    StoreFailure(#[source] StoreError),
}

impl VersionError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<StoreError> for VersionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => Self::NotFound(key),
            StoreError::PermissionDenied(message) => Self::PermissionDenied(message),
            other => Self::StoreFailure(other),
        }
    }
}

impl From<serde_json::Error> for VersionError {
    fn from(err: serde_json::Error) -> Self {
        Self::StoreFailure(StoreError::Json(err))
    }
}

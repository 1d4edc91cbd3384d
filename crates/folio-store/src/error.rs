//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error (disk full, broken file, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A record with this id already exists
    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    /// Invalid collection or record id
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Caller may not perform this operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Record data is not a JSON object
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// Create a not found error for a record in a collection.
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound(format!("{collection}/{id}"))
    }

    /// Create an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Create a permission denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Map an IO error, keeping permission failures distinguishable.
    pub(crate) fn from_io(err: std::io::Error, context: &str) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied(format!("{context}: {err}"))
        } else {
            Self::Io(err)
        }
    }
}

//! ULID-based identifier generation with prefixes.
//!
//! Identifiers in folio follow the pattern: `prefix_ulid`
//! For example: `ver_01hqxyz...` for versions.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Version,
    Document,
    Record,
}

impl IdPrefix {
    /// Get the string prefix for this identifier type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Version => "ver",
            IdPrefix::Document => "doc",
            IdPrefix::Record => "rec",
        }
    }
}

/// Identifier generation and parsing utilities.
pub struct Identifier;

impl Identifier {
    /// Generate a new ascending identifier (newer = larger).
    pub fn ascending(prefix: IdPrefix) -> String {
        Self::with_ulid(prefix, Ulid::new())
    }

    /// Generate an identifier with a specific ULID (for testing or imports).
    pub fn with_ulid(prefix: IdPrefix, ulid: Ulid) -> String {
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Check if an identifier has the expected prefix.
    pub fn has_prefix(id: &str, prefix: IdPrefix) -> bool {
        id.starts_with(prefix.as_str()) && id.chars().nth(prefix.as_str().len()) == Some('_')
    }

    /// Generate a version ID.
    pub fn version() -> String {
        Self::ascending(IdPrefix::Version)
    }

    /// Generate a document ID.
    pub fn document() -> String {
        Self::ascending(IdPrefix::Document)
    }

    /// Generate a generic record ID.
    pub fn record() -> String {
        Self::ascending(IdPrefix::Record)
    }
}

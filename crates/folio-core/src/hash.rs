//! Content digests used as dedup keys.

use sha2::{Digest, Sha256};

/// SHA-256 of `content`, lowercase hex.
///
/// Only compared between versions of the same document.
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

//! SHA-256 digest utilities
//!
//! Digests are plain lowercase hex. They are persisted in the change history,
//! so the format must stay stable across releases.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of string content.
pub fn content_digest(content: &str) -> String {
    bytes_digest(content.as_bytes())
}

/// Compute the SHA-256 hex digest of raw bytes.
pub fn bytes_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

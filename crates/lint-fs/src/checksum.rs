//! SHA-256 checksum utilities
//!
//! One canonical format (`sha256:<hex>`) is used for policy fingerprints and
//! analysis-argument hashes. [`file_stem`] turns a checksum into something
//! usable as a file name.

use sha2::{Digest, Sha256};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_content_checksum(content: &str) -> String {
    compute_parts_checksum([content])
}

/// Checksum over an ordered list of parts.
///
/// Parts are length-prefixed so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn compute_parts_checksum<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    let mut count = 0usize;
    for part in parts {
        if count > 0 || part.is_empty() {
            hasher.update((part.len() as u64).to_le_bytes());
        }
        hasher.update(part.as_bytes());
        count += 1;
    }
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Hex digest without the `sha256:` prefix.
pub fn file_stem(checksum: &str) -> &str {
    checksum.strip_prefix(PREFIX).unwrap_or(checksum)
}

//! SHA-256 checksum utilities
//!
//! Provides a single canonical checksum format (`sha256:<hex>`) used to
//! detect whether an installed binary already matches fetched content.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of in-memory content.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_checksum(&content))
}

/// Whether the file at `path` exists and has exactly `content`.
pub fn file_matches(path: &Path, content: &[u8]) -> bool {
    match compute_file_checksum(path) {
        Ok(existing) => existing == compute_checksum(content),
        Err(_) => false,
    }
}

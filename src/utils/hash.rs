use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of a string, hex encoded.
///
/// This is the fixed algorithm behind every `VersionId`; changing it
/// invalidates all persisted version records.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

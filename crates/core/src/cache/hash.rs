//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for one page of an endpoint.
///
/// The key material is the endpoint immediately followed by the decimal page
/// index, with no separator, hashed with SHA-256 and hex encoded.
pub fn compute_cache_key(endpoint: &str, page: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(page.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Check that a string looks like a key produced by [`compute_cache_key`].
pub fn is_cache_key(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

//! Request identity keys.
//!
//! Entries are keyed by method and URL only; request headers never take part
//! in the identity, and fragments are dropped before hashing.

use sha2::{Digest, Sha256};

use crate::Request;

/// Compute the identity key for a method/URL pair.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity key for an intercepted request.
pub fn request_key(request: &Request) -> String {
    compute_cache_key(&request.method, request.identity_url().as_str())
}

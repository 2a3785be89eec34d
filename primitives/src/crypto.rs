//! Hashing for the Keel generator.
//!
//! BLAKE3 backs raw storage keys, script hashes and code hashes. All hashing
//! is deterministic and unkeyed.

use crate::types::Hash;

/// Compute the BLAKE3 hash of the input data.
pub fn hash_blake3(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Compute the BLAKE3 hash of the concatenation of `parts`.
///
/// Equivalent to hashing the joined bytes, without allocating the join.
pub fn hash_blake3_parts(parts: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

//! Account key derivation.
//!
//! Contracts address storage with 32-byte logical keys. Before reaching the
//! key-value store every logical key is namespaced under the owning account
//! and a key type:
//!
//! ```text
//! raw_key = BLAKE3(account_id_le[4] || key_type[1] || logical_key[32])
//! ```
//!
//! The account's code-hash slot is the one exception. It is addressed by a
//! plain, unhashed key so the loader can find code without knowing any
//! contract-level key:
//!
//! ```text
//! code_hash_key = account_id_le[4] || ACCOUNT_CODE_HASH[1] || 0x00 * 27
//! ```

use crate::crypto::hash_blake3_parts;
use crate::types::{AccountId, Hash, ACCOUNT_CODE_HASH, KEY_BYTES};

/// Derive the raw storage key for `logical_key` in `account_id`'s namespace.
pub fn derive_kv_key(account_id: AccountId, key_type: u8, logical_key: &Hash) -> Hash {
    hash_blake3_parts(&[&account_id.to_le_bytes(), &[key_type], logical_key])
}

/// Build the raw key of `account_id`'s code-hash slot. Not hashed.
pub fn derive_code_hash_key(account_id: AccountId) -> Hash {
    let mut key = [0u8; KEY_BYTES];
    key[..4].copy_from_slice(&account_id.to_le_bytes());
    key[4] = ACCOUNT_CODE_HASH;
    key
}

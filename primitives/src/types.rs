//! Core type aliases and constants for the Keel generator.
//!
//! Sizes and key-type tags are consensus values: the off-chain generator and
//! the on-chain validator must agree on every one of them.

/// 32-byte hash used for script hashes, code hashes and raw storage keys.
pub type Hash = [u8; 32];

/// Numeric identifier of a user or contract account in the layer-2 state tree.
pub type AccountId = u32;

/// Length of a raw or logical storage key.
pub const KEY_BYTES: usize = 32;

/// Maximum number of bytes a call frame may place in its receipt.
pub const MAX_RETURN_DATA_SIZE: usize = 24 * 1024;

/// Maximum encoded size of a `CallContext` envelope (128 KiB).
pub const CALL_CONTEXT_MAX_LEN: usize = 131_072;

/// Maximum encoded size of a `BlockInfo` envelope.
pub const BLOCK_INFO_MAX_LEN: usize = 128;

/// Default capacity of the shared code buffer (512 KiB).
pub const CODE_SIZE: usize = 512 * 1024;

/// Key type tag for contract key-value slots.
pub const ACCOUNT_KV: u8 = 0;
/// Key type tag for account nonces.
pub const ACCOUNT_NONCE: u8 = 1;
/// Key type tag for account pubkey hashes.
pub const ACCOUNT_PUBKEY_HASH: u8 = 2;
/// Key type tag for the account code-hash slot.
pub const ACCOUNT_CODE_HASH: u8 = 3;

/// Convert a `Hash` to a hex string for display purposes.
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut s = String::with_capacity(66);
    s.push_str("0x");
    for byte in hash {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", byte);
    }
    s
}

/// Decode a u64 from little-endian bytes.
pub fn u64_from_le_bytes(bytes: &[u8]) -> Option<u64> {
    let buf: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(buf))
}

/// Decode a u32 from little-endian bytes.
pub fn u32_from_le_bytes(bytes: &[u8]) -> Option<u32> {
    let buf: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(buf))
}

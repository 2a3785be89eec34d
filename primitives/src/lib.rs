//! `keel-primitives` — foundational types for the Keel layer-2 generator.
//!
//! This crate provides the call and block envelopes and their codec, the
//! status codes and error type, account key derivation, hashing, and the
//! per-frame receipt shared by the dispatch engine and its hosts.

pub mod types;
pub mod error;
pub mod call;
pub mod codec;
pub mod crypto;
pub mod keys;
pub mod execution;

// Re-export commonly used types at the crate root for convenience.
pub use types::{AccountId, Hash, MAX_RETURN_DATA_SIZE};
pub use error::{ErrorCode, ExecError, ExecResult};
pub use call::{BlockInfo, CallContext, CallType};
pub use codec::{decode_block_info, decode_call_context, encode_block_info, encode_call_context};
pub use keys::{derive_code_hash_key, derive_kv_key};
pub use execution::{Receipt, RunResult, RunStatus};

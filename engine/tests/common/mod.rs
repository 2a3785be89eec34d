//! Shared test helpers for integration tests.
//!
//! Provides envelope encoding, host fixtures with registered accounts, and
//! generator factories used across all integration test files.

#![allow(dead_code)]

use keel_engine::{Generator, GeneratorConfig, MockHost};
use keel_primitives::{
    encode_block_info, encode_call_context, types::u32_from_le_bytes, AccountId, BlockInfo,
    CallContext, CallType, Hash,
};

/// Block used by every test unless it needs its own.
pub const TEST_BLOCK: BlockInfo = BlockInfo {
    number: 1024,
    timestamp: 1_700_000_000,
    producer_id: 1,
};

/// Install a tracing subscriber writing to the test harness. Idempotent.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Envelope Encoding ──

/// Encode a call context with a known call kind.
pub fn call_bytes(from_id: AccountId, to_id: AccountId, call_type: CallType, args: &[u8]) -> Vec<u8> {
    encode_call_context(&CallContext::new(from_id, to_id, call_type, args)).unwrap()
}

/// Encode a call context carrying an arbitrary raw call kind tag.
pub fn raw_call_bytes(from_id: AccountId, to_id: AccountId, raw_call_type: u8, args: &[u8]) -> Vec<u8> {
    encode_call_context(&CallContext {
        from_id,
        to_id,
        raw_call_type,
        args,
    })
    .unwrap()
}

pub fn block_bytes() -> Vec<u8> {
    encode_block_info(&TEST_BLOCK).unwrap()
}

// ── Host Fixtures ──

/// Script bytes registered for a test account.
pub fn script_for(account_id: AccountId) -> Vec<u8> {
    format!("script-{}", account_id).into_bytes()
}

/// Host with each of `ids` registered under [`script_for`].
pub fn host_with_accounts(ids: &[AccountId]) -> MockHost {
    let mut host = MockHost::new();
    for id in ids {
        host.register_account(*id, &script_for(*id));
    }
    host
}

/// Logical storage key from a short label.
pub fn key(label: u8) -> Hash {
    let mut key = [0u8; 32];
    key[0] = label;
    key
}

// ── Generator Factories ──

pub fn generator() -> Generator {
    Generator::new(GeneratorConfig::default())
}

pub fn generator_with_buffer(code_buffer_size: usize) -> Generator {
    Generator::new(GeneratorConfig {
        code_buffer_size,
        ..GeneratorConfig::default()
    })
}

/// Little-endian u32 at `index` of a packed u32 sequence.
pub fn u32_at(data: &[u8], index: usize) -> u32 {
    u32_from_le_bytes(&data[index * 4..]).expect("u32 in range")
}

//! Host interface trait — abstraction over the generator's syscalls.
//!
//! The `HostInterface` trait decouples the dispatch core from the environment
//! that owns state and accounts:
//!
//! - In production: implemented over the host VM's syscall transport
//! - In tests: implemented via `MockHost` (in-memory state and accounts)
//!
//! Every method is a direct synchronous round trip. The core never caches or
//! batches, and nothing here is transactional: a write is visible to every
//! later read in the same execution, whatever happens afterwards.

use std::collections::BTreeMap;

use keel_primitives::{
    crypto::hash_blake3, derive_code_hash_key, AccountId, ExecError, ExecResult, Hash,
};

/// Storage, account identity and account creation, as seen by the core.
pub trait HostInterface {
    /// Read the value stored under a raw key.
    ///
    /// Returns `Err(ExecError::NotFound)` if the key was never written.
    fn load(&self, raw_key: &Hash) -> ExecResult<Hash>;

    /// Write a value under a raw key.
    fn store(&mut self, raw_key: &Hash, value: &Hash) -> ExecResult<()>;

    /// Script hash identifying `account_id`.
    fn script_hash_of(&self, account_id: AccountId) -> ExecResult<Hash>;

    /// Account id registered for `script_hash`.
    fn account_id_of(&self, script_hash: &Hash) -> ExecResult<AccountId>;

    /// Raw script bytes of `account_id`.
    fn script_of(&self, account_id: AccountId) -> ExecResult<Vec<u8>>;

    /// Create an account from script bytes and return its id.
    fn create_account(&mut self, script: &[u8]) -> ExecResult<AccountId>;
}

// ── MockHost: in-memory host for testing ──

/// In-memory host for deterministic testing.
///
/// State and accounts live in `BTreeMap`s so iteration order is stable.
/// Script hashes are the BLAKE3 hash of the script bytes.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    state: BTreeMap<Hash, Hash>,
    scripts: BTreeMap<AccountId, Vec<u8>>,
    accounts_by_hash: BTreeMap<Hash, AccountId>,
    next_account_id: AccountId,
    store_count: usize,
}

impl MockHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account under a chosen id and return its script hash.
    ///
    /// Later `create_account` calls allocate ids above every registered one.
    pub fn register_account(&mut self, account_id: AccountId, script: &[u8]) -> Hash {
        let script_hash = hash_blake3(script);
        if let Some(old) = self.scripts.insert(account_id, script.to_vec()) {
            self.accounts_by_hash.remove(&hash_blake3(&old));
        }
        self.accounts_by_hash.insert(script_hash, account_id);
        self.next_account_id = self.next_account_id.max(account_id.saturating_add(1));
        script_hash
    }

    /// Point `account_id`'s code-hash slot at `code_hash`.
    pub fn install_code_hash(&mut self, account_id: AccountId, code_hash: Hash) {
        self.state.insert(derive_code_hash_key(account_id), code_hash);
    }

    /// Read a raw key directly.
    pub fn get_raw(&self, raw_key: &Hash) -> Option<&Hash> {
        self.state.get(raw_key)
    }

    /// All stored state, for assertions.
    pub fn state(&self) -> &BTreeMap<Hash, Hash> {
        &self.state
    }

    /// Number of `store` calls served so far.
    pub fn store_count(&self) -> usize {
        self.store_count
    }
}

impl HostInterface for MockHost {
    fn load(&self, raw_key: &Hash) -> ExecResult<Hash> {
        self.state.get(raw_key).copied().ok_or(ExecError::NotFound)
    }

    fn store(&mut self, raw_key: &Hash, value: &Hash) -> ExecResult<()> {
        self.state.insert(*raw_key, *value);
        self.store_count += 1;
        Ok(())
    }

    fn script_hash_of(&self, account_id: AccountId) -> ExecResult<Hash> {
        self.scripts
            .get(&account_id)
            .map(|script| hash_blake3(script))
            .ok_or(ExecError::NotFound)
    }

    fn account_id_of(&self, script_hash: &Hash) -> ExecResult<AccountId> {
        self.accounts_by_hash
            .get(script_hash)
            .copied()
            .ok_or(ExecError::NotFound)
    }

    fn script_of(&self, account_id: AccountId) -> ExecResult<Vec<u8>> {
        self.scripts.get(&account_id).cloned().ok_or(ExecError::NotFound)
    }

    fn create_account(&mut self, script: &[u8]) -> ExecResult<AccountId> {
        let script_hash = hash_blake3(script);
        if self.accounts_by_hash.contains_key(&script_hash) {
            return Err(ExecError::invalid_data("account script already registered"));
        }
        let account_id = self.next_account_id;
        self.register_account(account_id, script);
        Ok(account_id)
    }
}

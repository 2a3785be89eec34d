//! In-process contracts reachable without code loading.
//!
//! A builtin is selected by the exact script hash of the called account and
//! never touches the code buffer.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use keel_primitives::{types::hash_to_hex, ExecResult, Hash};

use crate::context::ExecutionContext;

/// A contract family implemented inside the generator.
pub trait BuiltinContract: Send + Sync {
    /// Short name, for diagnostics.
    fn name(&self) -> &str;

    fn construct(&self, ctx: &mut ExecutionContext<'_>) -> ExecResult<()>;

    fn handle_message(&self, ctx: &mut ExecutionContext<'_>) -> ExecResult<()>;
}

/// Builtins keyed by script hash.
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    contracts: BTreeMap<Hash, Arc<dyn BuiltinContract>>,
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `contract` for accounts whose script hash is `script_hash`.
    /// Replaces any previous registration for the same hash.
    pub fn register(&mut self, script_hash: Hash, contract: Arc<dyn BuiltinContract>) {
        self.contracts.insert(script_hash, contract);
    }

    pub fn get(&self, script_hash: &Hash) -> Option<Arc<dyn BuiltinContract>> {
        self.contracts.get(script_hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.contracts
                    .iter()
                    .map(|(hash, contract)| (hash_to_hex(hash), contract.name().to_string())),
            )
            .finish()
    }
}

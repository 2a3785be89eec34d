//! Per-frame execution context.
//!
//! One `ExecutionContext` exists per call frame. It borrows the decoded call
//! and block data, the shared code buffer and the collaborators, and owns the
//! frame's receipt. Contract entries receive it by `&mut` and reach storage,
//! identity, account creation and nested calls only through it.

use keel_primitives::{
    derive_kv_key, types::ACCOUNT_KV, AccountId, BlockInfo, CallContext, ExecError, ExecResult,
    Hash, Receipt,
};
use tracing::trace;

use crate::budget::CodeBuffer;
use crate::builtin::BuiltinRegistry;
use crate::dispatch;
use crate::host::HostInterface;
use crate::loader::CodeLoader;

/// One frame of execution: the decoded call, the block, the shared code
/// buffer, this frame's receipt and the host collaborators.
///
/// Contract entries receive it and reach storage and accounts only through it.
pub struct ExecutionContext<'a> {
    pub(crate) call: CallContext<'a>,
    pub(crate) block: &'a BlockInfo,
    pub(crate) code_buffer: &'a mut CodeBuffer,
    pub(crate) receipt: Receipt,
    pub(crate) host: &'a mut dyn HostInterface,
    pub(crate) loader: &'a dyn CodeLoader,
    pub(crate) builtins: &'a BuiltinRegistry,
    max_depth: Option<u32>,
    depth: u32,
}

impl<'a> ExecutionContext<'a> {
    /// Top-level frame, depth 0, with an empty receipt.
    pub(crate) fn new(
        call: CallContext<'a>,
        block: &'a BlockInfo,
        code_buffer: &'a mut CodeBuffer,
        host: &'a mut dyn HostInterface,
        loader: &'a dyn CodeLoader,
        builtins: &'a BuiltinRegistry,
        max_depth: Option<u32>,
    ) -> Self {
        Self {
            call,
            block,
            code_buffer,
            receipt: Receipt::new(),
            host,
            loader,
            builtins,
            max_depth,
            depth: 0,
        }
    }

    /// Child frame for `call`, sharing this frame's buffer and collaborators.
    ///
    /// Fails `InsufficientCapacity` when the child would exceed the configured
    /// maximum depth.
    pub(crate) fn sub_context<'s>(
        &'s mut self,
        call: CallContext<'s>,
    ) -> ExecResult<ExecutionContext<'s>> {
        let depth = self.depth + 1;
        if let Some(max) = self.max_depth {
            if depth > max {
                return Err(ExecError::InsufficientCapacity(format!(
                    "call depth {} exceeds maximum {}",
                    depth, max
                )));
            }
        }
        Ok(ExecutionContext {
            call,
            block: self.block,
            code_buffer: &mut *self.code_buffer,
            receipt: Receipt::new(),
            host: &mut *self.host,
            loader: self.loader,
            builtins: self.builtins,
            max_depth: self.max_depth,
            depth,
        })
    }

    /// Consume the frame and return its receipt.
    pub fn into_receipt(self) -> Receipt {
        self.receipt
    }

    // ── Syscalls ──

    /// Read `key` from the called account's key-value space.
    pub fn load(&self, key: &Hash) -> ExecResult<Hash> {
        let raw_key = derive_kv_key(self.call.to_id, ACCOUNT_KV, key);
        trace!(account_id = self.call.to_id, "load");
        self.host.load(&raw_key)
    }

    /// Write `value` under `key` in the called account's key-value space.
    ///
    /// The write is committed immediately and survives a later failure.
    pub fn store(&mut self, key: &Hash, value: &Hash) -> ExecResult<()> {
        let raw_key = derive_kv_key(self.call.to_id, ACCOUNT_KV, key);
        trace!(account_id = self.call.to_id, "store");
        self.host.store(&raw_key, value)
    }

    /// Overwrite this frame's return data.
    pub fn set_return_data(&mut self, data: &[u8]) -> ExecResult<()> {
        self.receipt.set_return_data(data)
    }

    /// Create an account from `script` and return its id.
    pub fn create_account(&mut self, script: &[u8]) -> ExecResult<AccountId> {
        self.host.create_account(script)
    }

    /// Script hash of `account_id`, or `NotFound`.
    pub fn script_hash_of(&self, account_id: AccountId) -> ExecResult<Hash> {
        self.host.script_hash_of(account_id)
    }

    /// Account registered under `script_hash`, or `NotFound`.
    pub fn account_id_of(&self, script_hash: &Hash) -> ExecResult<AccountId> {
        self.host.account_id_of(script_hash)
    }

    /// Raw script bytes of `account_id`.
    pub fn script_of(&self, account_id: AccountId) -> ExecResult<Vec<u8>> {
        self.host.script_of(account_id)
    }

    /// Call `handle_message` on `to_id` with `args`, returning the callee's
    /// receipt. Any callee error propagates unchanged.
    pub fn call(&mut self, to_id: AccountId, args: &[u8]) -> ExecResult<Receipt> {
        dispatch::invoke_nested(self, to_id, args)
    }

    // ── Accessors ──

    /// The call this frame is serving.
    pub fn call_context(&self) -> &CallContext<'a> {
        &self.call
    }

    pub fn block_info(&self) -> &BlockInfo {
        self.block
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// Nesting depth; the top-level frame is 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Bytes of the shared code buffer consumed so far by the whole call tree.
    pub fn code_buffer_used(&self) -> usize {
        self.code_buffer.used()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;
    use crate::loader::MemoryLoader;
    use keel_primitives::{CallType, MAX_RETURN_DATA_SIZE};

    struct Fixture {
        block: BlockInfo,
        buffer: CodeBuffer,
        host: MockHost,
        loader: MemoryLoader,
        builtins: BuiltinRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                block: BlockInfo {
                    number: 7,
                    timestamp: 1_700_000_000,
                    producer_id: 2,
                },
                buffer: CodeBuffer::with_capacity(256),
                host: MockHost::new(),
                loader: MemoryLoader::new(),
                builtins: BuiltinRegistry::new(),
            }
        }

        fn context(&mut self, to_id: AccountId, max_depth: Option<u32>) -> ExecutionContext<'_> {
            ExecutionContext::new(
                CallContext::new(1, to_id, CallType::HandleMessage, b"args"),
                &self.block,
                &mut self.buffer,
                &mut self.host,
                &self.loader,
                &self.builtins,
                max_depth,
            )
        }
    }

    #[test]
    fn test_store_then_load_scoped_to_callee() {
        let mut fx = Fixture::new();
        let key = [0x10; 32];
        {
            let mut ctx = fx.context(5, None);
            assert_eq!(ctx.load(&key), Err(ExecError::NotFound));
            ctx.store(&key, &[0x20; 32]).unwrap();
            assert_eq!(ctx.load(&key), Ok([0x20; 32]));
        }
        let raw = derive_kv_key(5, ACCOUNT_KV, &key);
        assert_eq!(fx.host.get_raw(&raw), Some(&[0x20; 32]));

        let ctx = fx.context(6, None);
        assert_eq!(ctx.load(&key), Err(ExecError::NotFound));
    }

    #[test]
    fn test_return_data_overflow_keeps_receipt() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context(5, None);
        ctx.set_return_data(&[1, 2, 3]).unwrap();

        let too_big = vec![0u8; MAX_RETURN_DATA_SIZE + 1];
        assert!(matches!(
            ctx.set_return_data(&too_big),
            Err(ExecError::InvalidData(_))
        ));
        assert_eq!(ctx.receipt().return_data(), &[1, 2, 3]);
        assert_eq!(ctx.into_receipt().into_return_data(), vec![1, 2, 3]);
    }

    #[test]
    fn test_accessors() {
        let mut fx = Fixture::new();
        let ctx = fx.context(5, None);
        assert_eq!(ctx.call_context().from_id, 1);
        assert_eq!(ctx.call_context().to_id, 5);
        assert_eq!(ctx.call_context().args, b"args");
        assert_eq!(ctx.block_info().number, 7);
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.code_buffer_used(), 0);
        assert!(ctx.receipt().is_empty());
    }

    #[test]
    fn test_sub_context_increments_depth() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context(5, Some(1));
        let child = ctx.sub_context(CallContext::nested(5, 6, &[])).unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(child.call_context().from_id, 5);
        assert_eq!(child.block_info().producer_id, 2);
        assert!(child.receipt().is_empty());
    }

    #[test]
    fn test_sub_context_depth_limit() {
        let mut fx = Fixture::new();
        let mut ctx = fx.context(5, Some(1));
        let mut child = ctx.sub_context(CallContext::nested(5, 6, &[])).unwrap();
        let err = child.sub_context(CallContext::nested(6, 7, &[])).err().unwrap();
        assert!(matches!(err, ExecError::InsufficientCapacity(_)));
    }

    #[test]
    fn test_identity_syscalls() {
        let mut fx = Fixture::new();
        let hash = fx.host.register_account(9, b"nine");
        let mut ctx = fx.context(5, None);
        assert_eq!(ctx.script_hash_of(9), Ok(hash));
        assert_eq!(ctx.account_id_of(&hash), Ok(9));
        assert_eq!(ctx.script_of(9), Ok(b"nine".to_vec()));

        let created = ctx.create_account(b"ten").unwrap();
        assert_eq!(created, 10);
    }
}

//! Generator — the top-level driver of one execution.
//!
//! `Generator::run` implements the execution lifecycle:
//!
//! 1. Allocate an empty code buffer (configured capacity)
//! 2. Decode the call context; failure aborts
//! 3. Decode the block info; failure aborts
//! 4. Dispatch the top-level frame (builtin fast path or dynamic load)
//! 5. Emit the outermost receipt on success, nothing on failure
//!
//! **No rollback:** storage writes already made when an error surfaces stay
//! committed. A failed execution is replayed from a clean state by the host,
//! never resumed.

use keel_primitives::{
    decode_block_info, decode_call_context, ExecResult, Receipt, RunResult,
};
use tracing::{debug, warn};

use crate::budget::CodeBuffer;
use crate::builtin::BuiltinRegistry;
use crate::config::GeneratorConfig;
use crate::context::ExecutionContext;
use crate::dispatch::run_frame;
use crate::host::HostInterface;
use crate::loader::CodeLoader;

/// The top-level driver.
///
/// Holds configuration and the builtin registry only. All state is reached
/// through the `HostInterface` and all code through the `CodeLoader`, so
/// the same inputs and collaborator responses always give the same result.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
    builtins: BuiltinRegistry,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            builtins: BuiltinRegistry::new(),
        }
    }

    /// Attach the builtin registry consulted on every dispatch.
    pub fn with_builtins(mut self, builtins: BuiltinRegistry) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn builtins(&self) -> &BuiltinRegistry {
        &self.builtins
    }

    /// Execute one top-level call.
    ///
    /// Never panics on bad input: every failure becomes a `RunResult` with
    /// `Failure` status, the error's exit code and no return data.
    pub fn run(
        &self,
        host: &mut dyn HostInterface,
        loader: &dyn CodeLoader,
        call_bytes: &[u8],
        block_bytes: &[u8],
    ) -> RunResult {
        match self.execute(host, loader, call_bytes, block_bytes) {
            Ok(receipt) => {
                debug!(return_data_len = receipt.len(), "emit receipt");
                RunResult::success(receipt)
            }
            Err(err) => {
                warn!(error = %err, exit_code = err.exit_code(), "execution failed");
                RunResult::failure(&err)
            }
        }
    }

    fn execute(
        &self,
        host: &mut dyn HostInterface,
        loader: &dyn CodeLoader,
        call_bytes: &[u8],
        block_bytes: &[u8],
    ) -> ExecResult<Receipt> {
        let mut code_buffer = CodeBuffer::with_capacity(self.config.code_buffer_size);

        debug!(len = call_bytes.len(), "decode call context");
        let call = decode_call_context(call_bytes)?;

        debug!(len = block_bytes.len(), "decode block info");
        let block = decode_block_info(block_bytes)?;

        debug!(
            from_id = call.from_id,
            to_id = call.to_id,
            call_type = call.raw_call_type,
            block = block.number,
            "dispatch"
        );
        let mut ctx = ExecutionContext::new(
            call,
            &block,
            &mut code_buffer,
            host,
            loader,
            &self.builtins,
            self.config.max_call_depth,
        );
        run_frame(&mut ctx)?;
        let receipt = ctx.into_receipt();

        debug!(code_buffer_used = code_buffer.used(), "execution complete");
        Ok(receipt)
    }
}

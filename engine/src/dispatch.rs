//! Frame dispatch and nested calls.
//!
//! Every frame, top-level or nested, goes through [`run_frame`]. The dispatch
//! path is chosen from the callee's script hash before the call kind is read.

use std::fmt;
use std::sync::Arc;

use keel_primitives::{AccountId, CallContext, CallType, ExecResult, Receipt};
use tracing::trace;

use crate::builtin::BuiltinContract;
use crate::context::ExecutionContext;
use crate::resolver;

/// How a frame's entry is reached.
#[derive(Clone)]
pub enum DispatchPath {
    /// In-process contract; no code is loaded.
    Builtin(Arc<dyn BuiltinContract>),
    /// Code opened through the loader and resolved by symbol.
    Dynamic,
}

impl fmt::Debug for DispatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(contract) => f.debug_tuple("Builtin").field(&contract.name()).finish(),
            Self::Dynamic => f.write_str("Dynamic"),
        }
    }
}

/// Choose the path for the frame's callee by its script hash.
pub(crate) fn select_path(ctx: &ExecutionContext<'_>) -> ExecResult<DispatchPath> {
    let script_hash = ctx.host.script_hash_of(ctx.call.to_id)?;
    Ok(match ctx.builtins.get(&script_hash) {
        Some(contract) => DispatchPath::Builtin(contract),
        None => DispatchPath::Dynamic,
    })
}

/// Run the entry of the frame described by `ctx`.
///
/// A builtin rejects an unknown call kind with `InvalidCallType`. Loaded code
/// runs `construct` for any kind other than `HandleMessage`.
pub(crate) fn run_frame(ctx: &mut ExecutionContext<'_>) -> ExecResult<()> {
    let path = select_path(ctx)?;
    trace!(
        to_id = ctx.call.to_id,
        call_type = ctx.call.raw_call_type,
        ?path,
        depth = ctx.depth(),
        "dispatch"
    );

    match path {
        DispatchPath::Builtin(contract) => match ctx.call.call_type()? {
            CallType::Construct => contract.construct(ctx),
            CallType::HandleMessage => contract.handle_message(ctx),
        },
        DispatchPath::Dynamic => {
            let call_type = ctx.call.loaded_call_type();
            resolver::invoke(ctx, call_type)
        }
    }
}

/// Call `handle_message` on `to_id` from the frame `parent`.
///
/// The child frame shares the parent's code buffer and collaborators and
/// starts with an empty receipt, which is returned on success. Storage
/// writes made by the callee are kept even when it fails.
pub fn invoke_nested(
    parent: &mut ExecutionContext<'_>,
    to_id: AccountId,
    args: &[u8],
) -> ExecResult<Receipt> {
    let from_id = parent.call.to_id;
    trace!(from_id, to_id, args_len = args.len(), "nested call");

    let mut child = parent.sub_context(CallContext::nested(from_id, to_id, args))?;
    run_frame(&mut child)?;
    Ok(child.into_receipt())
}

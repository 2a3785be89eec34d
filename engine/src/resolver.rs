//! Dynamic entry resolution.
//!
//! Opens the called account's code into the shared buffer, charges the bytes
//! it occupies, resolves the entry named after the call kind and runs it.

use keel_primitives::{CallType, ExecError, ExecResult};
use tracing::trace;

use crate::context::ExecutionContext;
use crate::loader::{EntryPoint, LoadedImage};

/// Open the callee's image into the free tail of the code buffer and advance
/// the cursor by the size the loader reports.
///
/// A reported size above the free space fails `InvalidData` with the cursor
/// unchanged.
pub(crate) fn load_image(ctx: &mut ExecutionContext<'_>) -> ExecResult<Box<dyn LoadedImage>> {
    let account_id = ctx.call.to_id;
    let available = ctx.code_buffer.remaining();
    let (image, consumed) =
        ctx.loader
            .open(&*ctx.host, account_id, ctx.code_buffer.free_space_mut())?;
    ctx.code_buffer.consume(consumed, available)?;
    trace!(account_id, consumed, used = ctx.code_buffer.used(), "image loaded");
    Ok(image)
}

/// Look up the canonical entry for `call_type`.
pub(crate) fn resolve_entry(image: &dyn LoadedImage, call_type: CallType) -> ExecResult<EntryPoint> {
    let symbol = call_type.entry_symbol();
    image
        .resolve(symbol)
        .ok_or_else(|| ExecError::dynamic_linking(format!("symbol `{}` not exported", symbol)))
}

/// Load, resolve and run the entry for `call_type` in `ctx`.
///
/// The entry's result is returned unchanged.
pub(crate) fn invoke(ctx: &mut ExecutionContext<'_>, call_type: CallType) -> ExecResult<()> {
    let image = load_image(ctx)?;
    let entry = resolve_entry(image.as_ref(), call_type)?;
    entry(ctx)
}

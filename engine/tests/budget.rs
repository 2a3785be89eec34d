//! Shared code buffer accounting across the call tree.

mod common;

use keel_engine::{entry, ExecutionContext, MemoryImage, MemoryLoader, ProgramImage, StaticLinker};
use keel_primitives::{CallType, ExecError, ExecResult};

use common::*;

const ROOT_SIZE: usize = 100;
const C1: usize = 1000;
const C2: usize = 2000;
const CAPACITY: usize = 4096;

/// Root account 5 calls 7 and 8, then 9, which needs one byte more than is
/// left. It reports `[used before, used after two calls, used after the
/// third attempt, third status]`.
fn budget_loader(third_size: usize) -> MemoryLoader {
    MemoryLoader::new()
        .with_image(5, MemoryImage::new(ROOT_SIZE).export("construct", entry(probe_budget)))
        .with_image(7, MemoryImage::new(C1).export("handle_message", entry(|_| Ok(()))))
        .with_image(8, MemoryImage::new(C2).export("handle_message", entry(|_| Ok(()))))
        .with_image(9, MemoryImage::new(third_size).export("handle_message", entry(|_| Ok(()))))
}

fn probe_budget(ctx: &mut ExecutionContext<'_>) -> ExecResult<()> {
    let before = ctx.code_buffer_used() as u32;
    ctx.call(7, &[])?;
    ctx.call(8, &[])?;
    let after_two = ctx.code_buffer_used() as u32;
    let status = match ctx.call(9, &[]) {
        Ok(_) => 0,
        Err(err) => err.exit_code(),
    };
    let after_third = ctx.code_buffer_used() as u32;

    let mut out = Vec::new();
    for value in [before, after_two, after_third, status as u32] {
        out.extend_from_slice(&value.to_le_bytes());
    }
    ctx.set_return_data(&out)
}

#[test]
fn test_nested_calls_share_one_cursor() {
    init_tracing();
    let mut host = host_with_accounts(&[5, 7, 8, 9]);
    let remaining_after_two = CAPACITY - ROOT_SIZE - C1 - C2;

    let result = generator_with_buffer(CAPACITY).run(
        &mut host,
        &budget_loader(remaining_after_two + 1),
        &call_bytes(1, 5, CallType::Construct, &[]),
        &block_bytes(),
    );

    assert!(result.is_success());
    let data = &result.return_data;
    assert_eq!(u32_at(data, 0) as usize, ROOT_SIZE);
    assert_eq!(u32_at(data, 1) as usize, ROOT_SIZE + C1 + C2);
    // The failed load leaves the cursor where it was.
    assert_eq!(u32_at(data, 2) as usize, ROOT_SIZE + C1 + C2);
    assert_eq!(u32_at(data, 3) as i32, 43);
}

#[test]
fn test_exact_fit_succeeds() {
    let mut host = host_with_accounts(&[5, 7, 8, 9]);
    let remaining_after_two = CAPACITY - ROOT_SIZE - C1 - C2;

    let result = generator_with_buffer(CAPACITY).run(
        &mut host,
        &budget_loader(remaining_after_two),
        &call_bytes(1, 5, CallType::Construct, &[]),
        &block_bytes(),
    );

    assert!(result.is_success());
    assert_eq!(u32_at(&result.return_data, 2) as usize, CAPACITY);
    assert_eq!(u32_at(&result.return_data, 3), 0);
}

#[test]
fn test_overrun_propagates_as_invalid_data() {
    let mut host = host_with_accounts(&[5, 7]);
    let loader = MemoryLoader::new()
        .with_image(
            5,
            MemoryImage::new(ROOT_SIZE).export(
                "construct",
                entry(|ctx| {
                    ctx.call(7, &[])?;
                    Ok(())
                }),
            ),
        )
        .with_image(7, MemoryImage::new(CAPACITY).export("handle_message", entry(|_| Ok(()))));

    let result = generator_with_buffer(CAPACITY).run(
        &mut host,
        &loader,
        &call_bytes(1, 5, CallType::Construct, &[]),
        &block_bytes(),
    );

    assert_eq!(result.exit_code, 43);
    assert!(result.return_data.is_empty());
}

#[test]
fn test_top_level_image_too_large() {
    let mut host = host_with_accounts(&[5]);
    let loader = MemoryLoader::new().with_image(
        5,
        MemoryImage::new(CAPACITY + 1).export("construct", entry(|_| Ok(()))),
    );

    let result = generator_with_buffer(CAPACITY).run(
        &mut host,
        &loader,
        &call_bytes(1, 5, CallType::Construct, &[]),
        &block_bytes(),
    );

    assert_eq!(result.exit_code, 43);
}

#[test]
fn test_repeat_call_charges_again() {
    let mut host = host_with_accounts(&[5, 7]);
    let loader = MemoryLoader::new()
        .with_image(
            5,
            MemoryImage::new(10).export(
                "construct",
                entry(|ctx| {
                    for _ in 0..3 {
                        ctx.call(7, &[])?;
                    }
                    let used = ctx.code_buffer_used() as u32;
                    ctx.set_return_data(&used.to_le_bytes())
                }),
            ),
        )
        .with_image(7, MemoryImage::new(20).export("handle_message", entry(|_| Ok(()))));

    let result = generator_with_buffer(CAPACITY).run(
        &mut host,
        &loader,
        &call_bytes(1, 5, CallType::Construct, &[]),
        &block_bytes(),
    );

    assert!(result.is_success());
    assert_eq!(u32_at(&result.return_data, 0), 70);
}

#[test]
fn test_static_linker_oversized_image() {
    let mut linker = StaticLinker::new();
    let code_hash = linker.link(
        ProgramImage::new(vec![0u8; CAPACITY + 1]).export("construct", entry(|_| Ok(()))),
    );
    let mut host = host_with_accounts(&[5]);
    host.install_code_hash(5, code_hash);

    let result = generator_with_buffer(CAPACITY).run(
        &mut host,
        &linker,
        &call_bytes(1, 5, CallType::Construct, &[]),
        &block_bytes(),
    );

    assert_eq!(result.exit_code, ExecError::invalid_data("").exit_code());
}

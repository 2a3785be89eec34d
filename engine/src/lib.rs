//! `keel-engine` — call dispatch core of the Keel layer-2 generator.
//!
//! Given a serialized call context and block info, the engine resolves the
//! called account's code, runs its canonical entry, mediates storage and
//! nested cross-contract calls, and packages the outermost return data.
//!
//! ## Architecture
//!
//! - [`host::HostInterface`] — trait over storage, account identity and creation
//! - [`host::MockHost`] — in-memory implementation for testing
//! - [`loader`] — code loading and symbol resolution (`StaticLinker`, `MemoryLoader`)
//! - [`budget::CodeBuffer`] — shared, monotonically consumed code arena
//! - [`context::ExecutionContext`] — per-frame syscall surface for contracts
//! - [`builtin`] — in-process contracts selected by script hash
//! - `resolver` — entry resolution against the shared code buffer
//! - [`dispatch`] — frame dispatch and nested calls
//! - [`generator::Generator`] — top-level driver

pub mod config;
pub mod budget;
pub mod host;
pub mod loader;
pub mod builtin;
pub mod context;
mod resolver;
pub mod dispatch;
pub mod generator;

// Re-export key types for convenience
pub use budget::CodeBuffer;
pub use builtin::{BuiltinContract, BuiltinRegistry};
pub use config::GeneratorConfig;
pub use context::ExecutionContext;
pub use dispatch::{invoke_nested, DispatchPath};
pub use generator::Generator;
pub use host::{HostInterface, MockHost};
pub use loader::{entry, CodeLoader, EntryPoint, LoadedImage, MemoryImage, MemoryLoader, ProgramImage, StaticLinker};

//! Code loading and symbol resolution.
//!
//! A [`CodeLoader`] opens an account's executable image into the free tail of
//! the shared code buffer and reports how many bytes it needs. The returned
//! [`LoadedImage`] resolves canonical entry names to callables.
//!
//! Two implementations live here:
//!
//! - [`StaticLinker`]: images registered by code hash, located through the
//!   account's code-hash slot in storage
//! - [`MemoryLoader`]: images registered directly per account id, for tests

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use keel_primitives::{
    crypto::hash_blake3, derive_code_hash_key, types::hash_to_hex, AccountId, ExecError,
    ExecResult, Hash,
};
use tracing::trace;

use crate::context::ExecutionContext;
use crate::host::HostInterface;

/// A resolved entry point. Runs to completion against the frame it is given.
pub type EntryPoint = Arc<dyn Fn(&mut ExecutionContext<'_>) -> ExecResult<()> + Send + Sync>;

/// Wrap a closure as an [`EntryPoint`].
pub fn entry<F>(f: F) -> EntryPoint
where
    F: Fn(&mut ExecutionContext<'_>) -> ExecResult<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A loaded executable image.
pub trait LoadedImage {
    /// Look up an exported symbol.
    fn resolve(&self, symbol: &str) -> Option<EntryPoint>;
}

impl<T: LoadedImage + ?Sized> LoadedImage for Arc<T> {
    fn resolve(&self, symbol: &str) -> Option<EntryPoint> {
        (**self).resolve(symbol)
    }
}

/// Opens account code into caller-provided space.
pub trait CodeLoader {
    /// Open the code of `account_id`, writing it into `buffer`.
    ///
    /// Returns the image handle and the number of bytes the image occupies.
    /// The caller checks that number against `buffer.len()`.
    fn open(
        &self,
        host: &dyn HostInterface,
        account_id: AccountId,
        buffer: &mut [u8],
    ) -> ExecResult<(Box<dyn LoadedImage>, usize)>;
}

/// Named exports of one image.
#[derive(Clone, Default)]
struct ExportTable {
    symbols: BTreeMap<String, EntryPoint>,
}

impl ExportTable {
    fn insert(&mut self, symbol: &str, entry: EntryPoint) {
        self.symbols.insert(symbol.to_string(), entry);
    }

    fn get(&self, symbol: &str) -> Option<EntryPoint> {
        self.symbols.get(symbol).cloned()
    }

    fn names(&self) -> Vec<&str> {
        self.symbols.keys().map(String::as_str).collect()
    }
}

// ── StaticLinker: production loader ──

/// An executable image: raw code bytes plus its export table.
#[derive(Clone)]
pub struct ProgramImage {
    code: Vec<u8>,
    exports: ExportTable,
}

impl ProgramImage {
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            code,
            exports: ExportTable::default(),
        }
    }

    /// Add an exported symbol.
    pub fn export(mut self, symbol: &str, entry: EntryPoint) -> Self {
        self.exports.insert(symbol, entry);
        self
    }

    /// BLAKE3 hash of the code bytes; the key the image is registered under.
    pub fn code_hash(&self) -> Hash {
        hash_blake3(&self.code)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }
}

impl fmt::Debug for ProgramImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramImage")
            .field("code_len", &self.code.len())
            .field("exports", &self.exports.names())
            .finish()
    }
}

impl LoadedImage for ProgramImage {
    fn resolve(&self, symbol: &str) -> Option<EntryPoint> {
        self.exports.get(symbol)
    }
}

/// Loader over a set of linked program images, addressed by code hash.
///
/// An account points at its image through the value stored under
/// `derive_code_hash_key(account_id)`.
#[derive(Debug, Default)]
pub struct StaticLinker {
    images: BTreeMap<Hash, Arc<ProgramImage>>,
}

impl StaticLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link an image and return its code hash.
    pub fn link(&mut self, image: ProgramImage) -> Hash {
        let code_hash = image.code_hash();
        self.images.insert(code_hash, Arc::new(image));
        code_hash
    }

    /// Number of linked images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl CodeLoader for StaticLinker {
    fn open(
        &self,
        host: &dyn HostInterface,
        account_id: AccountId,
        buffer: &mut [u8],
    ) -> ExecResult<(Box<dyn LoadedImage>, usize)> {
        let code_hash = host
            .load(&derive_code_hash_key(account_id))
            .map_err(|err| match err {
                ExecError::NotFound => ExecError::dynamic_linking(format!(
                    "account {} has no code hash",
                    account_id
                )),
                other => other,
            })?;

        let image = self.images.get(&code_hash).ok_or_else(|| {
            ExecError::dynamic_linking(format!(
                "no image linked for code hash {}",
                hash_to_hex(&code_hash)
            ))
        })?;

        let size = image.code.len();
        // An image that does not fit is left uncopied; the reported size
        // makes the caller reject it.
        if let Some(dest) = buffer.get_mut(..size) {
            dest.copy_from_slice(&image.code);
        }
        trace!(account_id, size, available = buffer.len(), "opened linked image");

        Ok((Box::new(Arc::clone(image)), size))
    }
}

// ── MemoryLoader: in-memory loader for testing ──

/// Image double with a declared size and an export table.
#[derive(Clone, Default)]
pub struct MemoryImage {
    size: usize,
    exports: ExportTable,
}

impl MemoryImage {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            exports: ExportTable::default(),
        }
    }

    pub fn export(mut self, symbol: &str, entry: EntryPoint) -> Self {
        self.exports.insert(symbol, entry);
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryImage")
            .field("size", &self.size)
            .field("exports", &self.exports.names())
            .finish()
    }
}

impl LoadedImage for MemoryImage {
    fn resolve(&self, symbol: &str) -> Option<EntryPoint> {
        self.exports.get(symbol)
    }
}

/// In-memory loader keyed by account id. Storage is never consulted.
///
/// Opening fills the first `size` bytes of the buffer (when they fit) with
/// the low byte of the account id, so tests can see what was placed where.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    images: BTreeMap<AccountId, Arc<MemoryImage>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `image` as the code of `account_id`.
    pub fn insert(&mut self, account_id: AccountId, image: MemoryImage) {
        self.images.insert(account_id, Arc::new(image));
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_image(mut self, account_id: AccountId, image: MemoryImage) -> Self {
        self.insert(account_id, image);
        self
    }
}

impl CodeLoader for MemoryLoader {
    fn open(
        &self,
        _host: &dyn HostInterface,
        account_id: AccountId,
        buffer: &mut [u8],
    ) -> ExecResult<(Box<dyn LoadedImage>, usize)> {
        let image = self.images.get(&account_id).ok_or_else(|| {
            ExecError::dynamic_linking(format!("no code for account {}", account_id))
        })?;
        if let Some(dest) = buffer.get_mut(..image.size) {
            dest.fill(account_id as u8);
        }
        Ok((Box::new(Arc::clone(image)), image.size))
    }
}

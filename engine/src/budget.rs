//! Shared code buffer.
//!
//! Every image loaded during one top-level execution, at any nesting depth,
//! is placed into a single fixed-capacity arena. The `used` cursor only moves
//! forward; nothing is ever unloaded until the execution ends.

use keel_primitives::{ExecError, ExecResult};

/// Fixed-capacity arena with a monotonic cursor.
///
/// Invariant: `used <= capacity`, re-checked on every [`consume`](Self::consume).
#[derive(Debug, Clone)]
pub struct CodeBuffer {
    data: Vec<u8>,
    used: usize,
}

impl CodeBuffer {
    /// Create an empty buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            used: 0,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes consumed so far.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.used
    }

    /// The unused tail, handed to the loader as its destination.
    pub fn free_space_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.used..]
    }

    /// The consumed prefix holding every image loaded so far.
    pub fn loaded(&self) -> &[u8] {
        &self.data[..self.used]
    }

    /// Advance the cursor by `consumed` bytes.
    ///
    /// `available` is the free space the loader was given. A loader that
    /// reports more than that fails with `InvalidData` and the cursor does
    /// not move.
    pub fn consume(&mut self, consumed: usize, available: usize) -> ExecResult<()> {
        if consumed > available || consumed > self.remaining() {
            return Err(ExecError::invalid_data(format!(
                "image of {} bytes exceeds {} bytes of free code buffer",
                consumed, available
            )));
        }
        self.used += consumed;
        Ok(())
    }
}

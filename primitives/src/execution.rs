//! Receipts and run results.
//!
//! Each call frame owns one `Receipt`. Only the outermost frame's receipt
//! leaves the generator, wrapped in a `RunResult`.

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, ExecResult};
use crate::types::MAX_RETURN_DATA_SIZE;

/// Per-frame return data, bounded by `MAX_RETURN_DATA_SIZE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    return_data: Vec<u8>,
}

impl Receipt {
    /// An empty receipt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the return data.
    ///
    /// Oversized data is rejected with `InvalidData` and the previous content
    /// is kept.
    pub fn set_return_data(&mut self, data: &[u8]) -> ExecResult<()> {
        if data.len() > MAX_RETURN_DATA_SIZE {
            return Err(ExecError::invalid_data(format!(
                "return data of {} bytes exceeds {}",
                data.len(),
                MAX_RETURN_DATA_SIZE
            )));
        }
        self.return_data.clear();
        self.return_data.extend_from_slice(data);
        Ok(())
    }

    /// Current return data.
    pub fn return_data(&self) -> &[u8] {
        &self.return_data
    }

    /// Length of the return data.
    pub fn len(&self) -> usize {
        self.return_data.len()
    }

    /// Returns true if no return data has been set.
    pub fn is_empty(&self) -> bool {
        self.return_data.is_empty()
    }

    /// Consume the receipt and return its data.
    pub fn into_return_data(self) -> Vec<u8> {
        self.return_data
    }
}

/// Terminal state of one top-level execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RunStatus {
    Success = 0,
    Failure = 1,
}

impl RunStatus {
    /// Returns true for `Success`.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl core::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}

/// What the generator hands back to the host.
///
/// On failure `return_data` is always empty, whatever the outermost receipt
/// held when the error was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Terminal state.
    pub status: RunStatus,
    /// Process exit status: 0 on success, the error's status otherwise.
    pub exit_code: i32,
    /// Return data of the outermost receipt.
    pub return_data: Vec<u8>,
}

impl RunResult {
    /// Successful run emitting the outermost receipt.
    pub fn success(receipt: Receipt) -> Self {
        Self {
            status: RunStatus::Success,
            exit_code: 0,
            return_data: receipt.into_return_data(),
        }
    }

    /// Failed run; nothing is emitted.
    pub fn failure(error: &ExecError) -> Self {
        Self {
            status: RunStatus::Failure,
            exit_code: error.exit_code(),
            return_data: Vec::new(),
        }
    }

    /// Returns true if the run succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

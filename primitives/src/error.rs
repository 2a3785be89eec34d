//! Error types for the Keel generator.
//!
//! Status codes are part of the process boundary: the driver exits with the
//! numeric code of the first error raised anywhere in the call tree.

use std::fmt;

/// Generator status codes. `0` is success, everything else is an error.
///
/// The repr values are shared with the on-chain validator and MUST NOT change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    NotFound = 42,
    InvalidData = 43,
    InsufficientCapacity = 44,
    InvalidContext = 45,
    DynamicLinking = 46,
}

impl ErrorCode {
    /// Convert from an i32 status code.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            42 => Some(Self::NotFound),
            43 => Some(Self::InvalidData),
            44 => Some(Self::InsufficientCapacity),
            45 => Some(Self::InvalidContext),
            46 => Some(Self::DynamicLinking),
            _ => None,
        }
    }

    /// Return the i32 representation of this status code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::NotFound => write!(f, "ERR_NOT_FOUND"),
            Self::InvalidData => write!(f, "ERR_INVALID_DATA"),
            Self::InsufficientCapacity => write!(f, "ERR_INSUFFICIENT_CAPACITY"),
            Self::InvalidContext => write!(f, "ERR_INVALID_CONTEXT"),
            Self::DynamicLinking => write!(f, "ERR_DYNAMIC_LINKING"),
        }
    }
}

/// Generic failure status, used for an unknown call type and for any error
/// that carries no status of its own.
pub const GENERIC_FAILURE_EXIT: i32 = -1;

/// Execution error raised by any layer of the generator.
///
/// Every variant maps to exactly one exit code via [`ExecError::exit_code`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    /// Storage key is absent.
    #[error("not found")]
    NotFound,

    /// Malformed or oversized input, return-data overflow or budget overrun.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Configured call depth exhausted.
    #[error("insufficient capacity: {0}")]
    InsufficientCapacity(String),

    /// Execution context is unset or unusable.
    #[error("invalid context: {0}")]
    InvalidContext(String),

    /// Loader failure or missing entry symbol.
    #[error("dynamic linking failed: {0}")]
    DynamicLinking(String),

    /// Raw call type tag that names no entry point.
    #[error("invalid call type: {0}")]
    InvalidCallType(u8),

    /// Nonzero status returned by a contract entry, propagated verbatim.
    #[error("contract exited with status {0}")]
    Contract(i32),
}

impl ExecError {
    /// Shorthand for [`ExecError::InvalidData`].
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Shorthand for [`ExecError::DynamicLinking`].
    pub fn dynamic_linking(msg: impl Into<String>) -> Self {
        Self::DynamicLinking(msg.into())
    }

    /// The generator status code behind this error, if it is one of ours.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::NotFound => Some(ErrorCode::NotFound),
            Self::InvalidData(_) => Some(ErrorCode::InvalidData),
            Self::InsufficientCapacity(_) => Some(ErrorCode::InsufficientCapacity),
            Self::InvalidContext(_) => Some(ErrorCode::InvalidContext),
            Self::DynamicLinking(_) => Some(ErrorCode::DynamicLinking),
            Self::InvalidCallType(_) => None,
            Self::Contract(code) => ErrorCode::from_i32(*code).filter(|c| !c.is_ok()),
        }
    }

    /// Process exit status for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidCallType(_) | Self::Contract(0) => GENERIC_FAILURE_EXIT,
            Self::Contract(code) => *code,
            other => other
                .error_code()
                .map(ErrorCode::as_i32)
                .unwrap_or(GENERIC_FAILURE_EXIT),
        }
    }
}

/// Convenience result type for the generator.
pub type ExecResult<T> = std::result::Result<T, ExecError>;

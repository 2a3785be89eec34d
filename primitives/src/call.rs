//! Call and block descriptors.
//!
//! A `CallContext` describes one invocation: who calls whom, with which entry
//! kind and which argument bytes. The call kind travels as the raw tag it was
//! decoded from. [`CallContext::call_type`] turns it into a [`CallType`] for
//! builtins, where an unknown tag is an error; [`CallContext::loaded_call_type`]
//! picks the entry of loaded code, where an unknown tag runs `construct`.

use serde::{Deserialize, Serialize};

use crate::error::{ExecError, ExecResult};
use crate::types::AccountId;

/// Entry kind of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CallType {
    /// Account construction; runs the `construct` entry.
    Construct = 0,
    /// Message delivery; runs the `handle_message` entry.
    HandleMessage = 1,
}

impl CallType {
    /// Convert from the raw wire tag.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Construct),
            1 => Some(Self::HandleMessage),
            _ => None,
        }
    }

    /// Return the raw wire tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Canonical symbol name of the entry point for this call kind.
    pub fn entry_symbol(self) -> &'static str {
        match self {
            Self::Construct => "construct",
            Self::HandleMessage => "handle_message",
        }
    }
}

impl TryFrom<u8> for CallType {
    type Error = ExecError;

    fn try_from(tag: u8) -> ExecResult<Self> {
        Self::from_u8(tag).ok_or(ExecError::InvalidCallType(tag))
    }
}

impl core::fmt::Display for CallType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.entry_symbol())
    }
}

/// Decoded description of one invocation.
///
/// `args` borrows from the buffer the context was decoded from (or from the
/// calling frame for nested calls) and cannot outlive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext<'a> {
    /// Calling account.
    pub from_id: AccountId,
    /// Called account; every storage access of the frame is scoped to it.
    pub to_id: AccountId,
    /// Raw call kind tag, exactly as decoded.
    pub raw_call_type: u8,
    /// Argument bytes.
    pub args: &'a [u8],
}

impl<'a> CallContext<'a> {
    /// Create a call context with a known call kind.
    pub fn new(from_id: AccountId, to_id: AccountId, call_type: CallType, args: &'a [u8]) -> Self {
        Self {
            from_id,
            to_id,
            raw_call_type: call_type.as_u8(),
            args,
        }
    }

    /// Context of a cross-contract call made by `from_id`. Nested calls are
    /// always message deliveries.
    pub fn nested(from_id: AccountId, to_id: AccountId, args: &'a [u8]) -> Self {
        Self::new(from_id, to_id, CallType::HandleMessage, args)
    }

    /// The call kind, or `InvalidCallType` for an unknown tag.
    pub fn call_type(&self) -> ExecResult<CallType> {
        CallType::try_from(self.raw_call_type)
    }

    /// The call kind used to pick an entry from loaded code: anything other
    /// than `HandleMessage` runs `construct`.
    pub fn loaded_call_type(&self) -> CallType {
        match CallType::from_u8(self.raw_call_type) {
            Some(CallType::HandleMessage) => CallType::HandleMessage,
            _ => CallType::Construct,
        }
    }
}

/// Block metadata shared by every frame of one execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block number.
    pub number: u64,
    /// Block timestamp from the block header.
    pub timestamp: u64,
    /// Account id of the block producer.
    pub producer_id: AccountId,
}

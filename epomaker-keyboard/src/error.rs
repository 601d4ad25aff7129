//! Keyboard interface error types

use epomaker_transport::{EncodingError, TransportError};
use thiserror::Error;

/// Bad input, caught before anything is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} = {value} out of range ({min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Unsupported light pattern: 0x{0:02X}")]
    UnsupportedPattern(u8),

    #[error("Wrong resolution: got {got} bytes, expected {expected}")]
    WrongResolution { got: usize, expected: usize },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl ValidationError {
    pub(crate) fn out_of_range(field: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }
}

/// Errors from keyboard operations
#[derive(Error, Debug)]
pub enum KeyboardError {
    /// Rejected input
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Command could not be framed
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl KeyboardError {
    /// Whether the device is gone and the caller should stop using it
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_fatal())
    }
}

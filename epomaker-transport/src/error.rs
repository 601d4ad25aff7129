//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Interface {0} not found on device")]
    InterfaceNotFound(i32),

    #[error("Invalid interface number {0} (expected 0, 1 or 2)")]
    InvalidInterface(i32),

    /// Another handle in this process already owns the device
    #[error("Device busy: {0}")]
    DeviceBusy(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Communication timeout")]
    Timeout,

    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl TransportError {
    /// Fatal errors mean the handle is unusable and retrying is pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Disconnected | Self::DeviceNotFound(_) | Self::HidPermissionDenied(_)
        )
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else if msg.contains("No such device") || msg.contains("ENODEV") {
            TransportError::Disconnected
        } else {
            TransportError::HidError(msg)
        }
    }
}

/// Errors produced while building report frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Payload of {len} bytes needs {frames} frames (limit {limit})")]
    PayloadTooLarge {
        len: usize,
        frames: usize,
        limit: usize,
    },

    #[error("Header of {header} bytes and {data} data bytes do not fit one report")]
    ReportOverflow { header: usize, data: usize },

    #[error("Report header is empty")]
    EmptyHeader,
}

/// Errors produced while reassembling received frames
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("No frames to reassemble")]
    Empty,

    #[error("Frame {index}: checksum stored 0x{stored:02X}, computed 0x{computed:02X}")]
    Checksum {
        index: usize,
        stored: u8,
        computed: u8,
    },

    #[error("Mixed command codes in one transfer (0x{expected:02X} vs 0x{got:02X})")]
    MixedCommand { expected: u8, got: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(TransportError::Disconnected.is_fatal());
        assert!(TransportError::DeviceNotFound("x".into()).is_fatal());
        assert!(!TransportError::Timeout.is_fatal());
        assert!(!TransportError::HidError("io".into()).is_fatal());
        assert!(!TransportError::DeviceBusy("x".into()).is_fatal());
    }
}

//! Common types for transport layer

use crate::protocol::cmd;

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface number the handle was opened on
    pub interface_number: i32,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// Identity of the physical device, shared by all of its interfaces
    pub fn device_key(&self) -> DeviceKey {
        DeviceKey {
            vid: self.vid,
            pid: self.pid,
            serial: self.serial.clone().unwrap_or_default(),
        }
    }
}

/// Physical device identity used for in-process exclusivity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceKey {
    pub vid: u16,
    pub pid: u16,
    pub serial: String,
}

impl std::fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vid, self.pid)?;
        if !self.serial.is_empty() {
            write!(f, " ({})", self.serial)?;
        }
        Ok(())
    }
}

/// One HID interface of a supported keyboard, as found by enumeration
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}

/// Acknowledgement read back from the device after a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Device accepted the last frame
    Accepted,
    /// Device answered with an error status byte
    Rejected(u8),
    /// Nothing meaningful was returned
    Unknown,
}

impl DeviceStatus {
    /// Interpret the first byte of a status report
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            cmd::STATUS_SUCCESS => Self::Accepted,
            0 => Self::Unknown,
            other => Self::Rejected(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_byte() {
        assert_eq!(DeviceStatus::from_byte(0xAA), DeviceStatus::Accepted);
        assert_eq!(DeviceStatus::from_byte(0x00), DeviceStatus::Unknown);
        assert_eq!(DeviceStatus::from_byte(0x55), DeviceStatus::Rejected(0x55));
    }

    #[test]
    fn test_device_key_ignores_interface() {
        let a = TransportDeviceInfo {
            vid: 0x3151,
            pid: 0x4010,
            interface_number: 0,
            device_path: "1-2:1.0".into(),
            serial: None,
            product_name: None,
        };
        let b = TransportDeviceInfo {
            interface_number: 2,
            device_path: "1-2:1.2".into(),
            ..a.clone()
        };
        assert_eq!(a.device_key(), b.device_key());
        assert_eq!(a.device_key().to_string(), "3151:4010");
    }
}

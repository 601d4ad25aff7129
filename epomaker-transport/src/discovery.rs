//! Device discovery for Epomaker keyboards

use std::sync::Arc;

use async_trait::async_trait;
use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::device_registry::{self, handle_registry};
use crate::error::TransportError;
use crate::hid_wired::HidWiredTransport;
use crate::protocol::device;
use crate::types::{DiscoveredDevice, TransportDeviceInfo};
use crate::Transport;

/// Device discovery abstraction
#[async_trait]
pub trait DeviceDiscovery: Send + Sync {
    /// List currently available interfaces of supported devices
    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError>;

    /// Open a specific device interface
    async fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError>;
}

/// HID device discovery for wired connections
pub struct HidDiscovery {
    /// Known VID/PID pairs to look for
    known_devices: Vec<(u16, u16)>,
}

impl Default for HidDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject interface numbers the keyboard does not expose
pub fn validate_interface(interface_number: i32) -> Result<(), TransportError> {
    if device::INTERFACES.contains(&interface_number) {
        Ok(())
    } else {
        Err(TransportError::InvalidInterface(interface_number))
    }
}

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self {
            known_devices: device_registry::PRODUCT_IDS
                .iter()
                .map(|&pid| (device::VENDOR_ID, pid))
                .collect(),
        }
    }

    /// Add a VID/PID pair to discover
    pub fn add_device(&mut self, vid: u16, pid: u16) {
        if !self.known_devices.contains(&(vid, pid)) {
            self.known_devices.push((vid, pid));
        }
    }

    /// Check if a device matches our known devices
    fn is_known_device(&self, vid: u16, pid: u16) -> bool {
        self.known_devices.contains(&(vid, pid))
    }

    fn describe(device_info: &hidapi::DeviceInfo) -> TransportDeviceInfo {
        TransportDeviceInfo {
            vid: device_info.vendor_id(),
            pid: device_info.product_id(),
            interface_number: device_info.interface_number(),
            device_path: device_info.path().to_string_lossy().to_string(),
            serial: device_info
                .serial_number()
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            product_name: device_info.product_string().map(|s| s.to_string()),
        }
    }

    /// Open the first supported keyboard on the given interface number.
    ///
    /// Interface 0 carries regular typing; it is accepted when asked for
    /// explicitly but logs a warning.
    pub async fn open(&self, interface_number: i32) -> Result<Arc<dyn Transport>, TransportError> {
        validate_interface(interface_number)?;
        if interface_number == device::KEYBOARD_INTERFACE {
            warn!("Interface 0 is the typing endpoint; input may stall while it is in use");
        }

        let devices = self.list_devices().await?;
        if devices.is_empty() {
            return Err(TransportError::DeviceNotFound(format!(
                "no supported keyboard (VID {:04X})",
                device::VENDOR_ID
            )));
        }
        let target = devices
            .iter()
            .find(|d| d.info.interface_number == interface_number)
            .ok_or(TransportError::InterfaceNotFound(interface_number))?;
        self.open_device(target).await
    }
}

#[async_trait]
impl DeviceDiscovery for HidDiscovery {
    async fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new().map_err(TransportError::from)?;
        let mut devices = Vec::new();

        for device_info in api.device_list() {
            if !self.is_known_device(device_info.vendor_id(), device_info.product_id()) {
                continue;
            }
            let info = Self::describe(device_info);
            debug!(
                "Found device: VID={:04X} PID={:04X} interface={} path={}",
                info.vid, info.pid, info.interface_number, info.device_path
            );
            devices.push(DiscoveredDevice { info });
        }

        devices.sort_by(|a, b| {
            (a.info.pid, a.info.interface_number).cmp(&(b.info.pid, b.info.interface_number))
        });
        devices.dedup_by(|a, b| a.info.device_path == b.info.device_path);

        info!("Found {} interfaces", devices.len());
        Ok(devices)
    }

    async fn open_device(
        &self,
        device: &DiscoveredDevice,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        // Claim before touching the OS handle so a busy device is never reopened
        let lease = handle_registry().acquire(device.info.device_key())?;

        let api = HidApi::new().map_err(TransportError::from)?;
        let device_info = api
            .device_list()
            .find(|d| d.path().to_string_lossy() == device.info.device_path)
            .ok_or_else(|| {
                TransportError::DeviceNotFound(format!(
                    "{:04X}:{:04X} interface {}",
                    device.info.vid, device.info.pid, device.info.interface_number
                ))
            })?;
        let hid = device_info.open_device(&api).map_err(TransportError::from)?;

        info!(
            "Opened {} on interface {}",
            device_registry::model_name(device.info.pid),
            device.info.interface_number
        );
        Ok(Arc::new(HidWiredTransport::new(
            hid,
            device.info.clone(),
            lease,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_interface() {
        assert!(validate_interface(0).is_ok());
        assert!(validate_interface(2).is_ok());
        assert!(matches!(
            validate_interface(3),
            Err(TransportError::InvalidInterface(3))
        ));
        assert!(validate_interface(-1).is_err());
    }

    #[test]
    fn test_known_devices() {
        let mut discovery = HidDiscovery::new();
        assert!(discovery.is_known_device(0x3151, 0x4010));
        assert!(!discovery.is_known_device(0x3151, 0x4020));
        discovery.add_device(0x3151, 0x4020);
        discovery.add_device(0x3151, 0x4020);
        assert!(discovery.is_known_device(0x3151, 0x4020));
        assert_eq!(discovery.known_devices.len(), 3);
    }

    fn phantom(serial: &str) -> DiscoveredDevice {
        DiscoveredDevice {
            info: TransportDeviceInfo {
                vid: device::VENDOR_ID,
                pid: 0x40FF,
                interface_number: device::DEFAULT_INTERFACE,
                device_path: format!("/nonexistent/{serial}"),
                serial: Some(serial.to_string()),
                product_name: None,
            },
        }
    }

    #[tokio::test]
    async fn test_open_device_checks_lease_first() {
        let target = phantom("lease-first");
        let key = target.info.device_key();
        let discovery = HidDiscovery::new();

        let held = handle_registry().acquire(key.clone()).unwrap();
        // The path does not exist, so only the lease check can produce DeviceBusy
        assert!(matches!(
            discovery.open_device(&target).await,
            Err(TransportError::DeviceBusy(_))
        ));
        drop(held);

        let result = discovery.open_device(&target).await;
        assert!(!matches!(result, Err(TransportError::DeviceBusy(_))));
        assert!(result.is_err());
        assert!(!handle_registry().is_held(&key));
    }

    #[tokio::test]
    #[ignore] // requires hardware
    async fn test_open_default_interface() {
        let transport = HidDiscovery::new()
            .open(device::DEFAULT_INTERFACE)
            .await
            .unwrap();
        assert_eq!(transport.device_info().interface_number, 2);
        assert!(transport.is_connected().await);
    }
}

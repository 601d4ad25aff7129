//! Device registry - supported PIDs and in-process handle ownership
//!
//! The OS serializes access across processes; within one process the
//! keyboard may only be driven through a single interface at a time, so
//! every opened transport holds a [`DeviceLease`] from the global
//! [`HandleRegistry`].

use std::collections::HashSet;
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::TransportError;
use crate::types::DeviceKey;

pub use crate::protocol::device::VENDOR_ID;

/// Known RT100 product IDs
pub const PRODUCT_IDS: &[u16] = &[
    crate::protocol::device::PID_RT100,
    crate::protocol::device::PID_RT100_REV2,
];

/// Check if a VID/PID pair is a supported keyboard
#[inline]
pub fn is_supported(vid: u16, pid: u16) -> bool {
    vid == VENDOR_ID && PRODUCT_IDS.contains(&pid)
}

/// Marketing name for a supported PID
pub fn model_name(pid: u16) -> &'static str {
    match pid {
        crate::protocol::device::PID_RT100 => "Epomaker RT100",
        crate::protocol::device::PID_RT100_REV2 => "Epomaker RT100 (rev 2)",
        _ => "Unknown",
    }
}

/// Set of physical devices currently owned by a transport in this process
#[derive(Debug, Default)]
pub struct HandleRegistry {
    held: Mutex<HashSet<DeviceKey>>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a device; fails with `DeviceBusy` if another handle holds it.
    pub fn acquire(&'static self, key: DeviceKey) -> Result<DeviceLease, TransportError> {
        let mut held = self.held.lock();
        if !held.insert(key.clone()) {
            return Err(TransportError::DeviceBusy(format!(
                "{key} is already open in this process"
            )));
        }
        debug!("Acquired device lease for {}", key);
        Ok(DeviceLease {
            registry: self,
            key,
        })
    }

    /// Whether a device is currently claimed
    pub fn is_held(&self, key: &DeviceKey) -> bool {
        self.held.lock().contains(key)
    }

    fn release(&self, key: &DeviceKey) {
        self.held.lock().remove(key);
        debug!("Released device lease for {}", key);
    }
}

/// Exclusive claim on a physical device; released on drop
#[derive(Debug)]
pub struct DeviceLease {
    registry: &'static HandleRegistry,
    key: DeviceKey,
}

impl DeviceLease {
    pub fn key(&self) -> &DeviceKey {
        &self.key
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}

// Global singleton registry
static HANDLES: OnceLock<HandleRegistry> = OnceLock::new();

/// Get the global handle registry
pub fn handle_registry() -> &'static HandleRegistry {
    HANDLES.get_or_init(HandleRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(serial: &str) -> DeviceKey {
        DeviceKey {
            vid: VENDOR_ID,
            pid: 0x4010,
            serial: serial.to_string(),
        }
    }

    #[test]
    fn test_known_pids() {
        assert!(is_supported(0x3151, 0x4010));
        assert!(is_supported(0x3151, 0x4015));
        assert!(!is_supported(0x3151, 0x5030));
        assert!(!is_supported(0x1234, 0x4010));
        assert_eq!(model_name(0x4010), "Epomaker RT100");
    }

    #[test]
    fn test_second_acquire_is_busy() {
        let registry = handle_registry();
        let lease = registry.acquire(key("registry-busy")).unwrap();
        assert!(matches!(
            registry.acquire(key("registry-busy")),
            Err(TransportError::DeviceBusy(_))
        ));
        drop(lease);
        assert!(!registry.is_held(&key("registry-busy")));
        let _again = registry.acquire(key("registry-busy")).unwrap();
    }

    #[test]
    fn test_distinct_devices_independent() {
        let registry = handle_registry();
        let _a = registry.acquire(key("registry-a")).unwrap();
        let _b = registry.acquire(key("registry-b")).unwrap();
        assert!(registry.is_held(&key("registry-a")));
        assert!(registry.is_held(&key("registry-b")));
    }
}

//! HID Wired transport implementation for direct USB connection

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use hidapi::HidDevice;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::device_registry::DeviceLease;
use crate::error::TransportError;
use crate::frame::Frame;
use crate::protocol::{cmd, REPORT_SIZE};
use crate::types::{DeviceStatus, TransportDeviceInfo};
use crate::Transport;

/// HID transport for wired USB connection
///
/// Writes each frame as one 64-byte feature report, command code first, on
/// the interface it was opened on. The HID handle and the in-process lease are both released when the
/// transport is dropped.
pub struct HidWiredTransport {
    device: Mutex<HidDevice>,
    info: TransportDeviceInfo,
    connected: AtomicBool,
    _lease: DeviceLease,
}

impl HidWiredTransport {
    /// Create a new wired transport from an opened HID device
    ///
    /// # Arguments
    /// * `device` - HID device for feature reports
    /// * `info` - Device information
    /// * `lease` - In-process ownership claim for the physical device
    pub fn new(device: HidDevice, info: TransportDeviceInfo, lease: DeviceLease) -> Self {
        Self {
            device: Mutex::new(device),
            info,
            connected: AtomicBool::new(true),
            _lease: lease,
        }
    }

    fn mark_if_gone(&self, err: &TransportError) {
        if matches!(err, TransportError::Disconnected) {
            warn!(
                "Device {:04X}:{:04X} disconnected",
                self.info.vid, self.info.pid
            );
            self.connected.store(false, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Transport for HidWiredTransport {
    async fn write_frame(&self, frame: &Frame) -> Result<(), TransportError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        let buf = frame.to_report();
        debug!(
            "Sending {}: {:02X?}",
            cmd::name(frame.command()),
            &buf[..frame.header().len() + 1]
        );

        let result = self
            .device
            .lock()
            .send_feature_report(&buf)
            .map_err(TransportError::from);
        if let Err(e) = &result {
            self.mark_if_gone(e);
        }
        result
    }

    async fn read_status(&self) -> Result<DeviceStatus, TransportError> {
        // Report id 0 in front of the status report
        let mut buf = [0u8; REPORT_SIZE + 1];
        let result = self
            .device
            .lock()
            .get_feature_report(&mut buf)
            .map_err(TransportError::from);
        match result {
            Ok(len) if len > 1 => Ok(DeviceStatus::from_byte(buf[1])),
            Ok(_) => Ok(DeviceStatus::Unknown),
            Err(e) => {
                self.mark_if_gone(&e);
                Err(e)
            }
        }
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

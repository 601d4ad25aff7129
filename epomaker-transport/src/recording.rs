//! Recording transport
//!
//! Stands in for the keyboard in dry-run mode and tests: frames are logged
//! and kept in memory instead of being written to hardware. Faults can be
//! scripted to exercise retry and disconnect handling.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::device_registry::{handle_registry, DeviceLease};
use crate::error::TransportError;
use crate::frame::Frame;
use crate::protocol::{cmd, device};
use crate::types::{DeviceStatus, TransportDeviceInfo};
use crate::Transport;

/// Failure injected into the next write attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFault {
    /// Non-fatal error (surfaces as `Timeout`)
    Transient,
    /// Device vanished; every later write fails too
    Disconnect,
}

pub struct RecordingTransport {
    info: TransportDeviceInfo,
    frames: Mutex<Vec<Frame>>,
    faults: Mutex<VecDeque<ScriptedFault>>,
    attempts: AtomicUsize,
    connected: AtomicBool,
    _lease: Option<DeviceLease>,
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingTransport {
    /// Recording transport posing as an RT100 on the default interface
    pub fn new() -> Self {
        Self::with_info(TransportDeviceInfo {
            vid: device::VENDOR_ID,
            pid: device::PID_RT100,
            interface_number: device::DEFAULT_INTERFACE,
            device_path: "dry-run".to_string(),
            serial: None,
            product_name: Some("Epomaker RT100 (dry run)".to_string()),
        })
    }

    pub fn with_info(info: TransportDeviceInfo) -> Self {
        Self {
            info,
            frames: Mutex::new(Vec::new()),
            faults: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
            connected: AtomicBool::new(true),
            _lease: None,
        }
    }

    /// Like [`with_info`](Self::with_info) but claims the device in the
    /// process-wide handle registry, as a real transport would.
    pub fn leased(info: TransportDeviceInfo) -> Result<Self, TransportError> {
        let lease = handle_registry().acquire(info.device_key())?;
        Ok(Self {
            _lease: Some(lease),
            ..Self::with_info(info)
        })
    }

    /// Queue a failure for an upcoming write attempt
    pub fn fail_next(&self, fault: ScriptedFault) {
        self.faults.lock().push_back(fault);
    }

    /// Frames successfully written so far
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Take and clear the recorded frames
    pub fn take_frames(&self) -> Vec<Frame> {
        std::mem::take(&mut *self.frames.lock())
    }

    /// Number of write attempts, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn write_frame(&self, frame: &Frame) -> Result<(), TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Disconnected);
        }
        match self.faults.lock().pop_front() {
            Some(ScriptedFault::Transient) => return Err(TransportError::Timeout),
            Some(ScriptedFault::Disconnect) => {
                self.connected.store(false, Ordering::SeqCst);
                return Err(TransportError::Disconnected);
            }
            None => {}
        }

        debug!(
            "[dry-run] {} {:02X?} | {:02X?}",
            cmd::name(frame.command()),
            frame.header(),
            frame.payload()
        );
        self.frames.lock().push(frame.clone());
        Ok(())
    }

    async fn read_status(&self) -> Result<DeviceStatus, TransportError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(DeviceStatus::Accepted)
        } else {
            Err(TransportError::Disconnected)
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

//! Transport abstraction layer for Epomaker RT100 keyboard communication
//!
//! This crate provides the wire side of the driver:
//!
//! - report framing (`frame`): 64-byte feature reports with a checksummed
//!   header, and splitting large bodies into data reports
//! - HID wired transport over `hidapi`, opened on one of the keyboard's
//!   interfaces with in-process exclusivity
//! - flow control: ordered transfers, retry with backoff, inter-frame delay
//! - a recording transport for dry runs and tests

pub mod device_registry;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod recording;
pub mod types;

mod discovery;
mod flow_control;
mod hid_wired;

pub use device_registry::{
    handle_registry, is_supported, DeviceLease, HandleRegistry, PRODUCT_IDS, VENDOR_ID,
};
pub use error::{EncodingError, FrameError, TransportError};
pub use frame::{reassemble, split, Frame};
pub use recording::{RecordingTransport, ScriptedFault};
pub use types::{DeviceKey, DeviceStatus, DiscoveredDevice, TransportDeviceInfo};

pub use discovery::{validate_interface, DeviceDiscovery, HidDiscovery};
pub use flow_control::{FlowControlTransport, RetryPolicy};
pub use hid_wired::HidWiredTransport;

use async_trait::async_trait;

/// The core transport trait - all backends implement this
///
/// A transport writes single frames; ordering across a multi-frame transfer
/// is the job of [`FlowControlTransport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write one frame, blocking until the OS layer accepts it
    async fn write_frame(&self, frame: &frame::Frame) -> Result<(), TransportError>;

    /// Poll the device's acknowledgement status
    async fn read_status(&self) -> Result<DeviceStatus, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Check if transport is still connected
    async fn is_connected(&self) -> bool;

    /// Close the transport gracefully
    async fn close(&self) -> Result<(), TransportError>;
}

//! High-level keyboard interface for Epomaker RT100 keyboards
//!
//! This crate turns intents (colors, pictures, numbers, the time) into
//! validated [`Command`]s, encodes them into 64-byte reports and hands the
//! frames to a flow-controlled transport.

pub mod bitmap;
pub mod command;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod led;

pub use bitmap::{convert, Bitmap};
pub use command::{
    Command, KeyColorMap, KeyColors, KeyFrame, KeyRemap, NumericDisplay, NumericKind, Timestamp,
};
pub use encoder::encode;
pub use error::{KeyboardError, ValidationError};
pub use layout::{rt100, Key, KeyLayout};
pub use led::{Direction, LightMode, LightProfile, RgbColor};

use std::sync::Arc;
use std::time::Duration;

use epomaker_transport::protocol::timing;
use epomaker_transport::{DeviceStatus, FlowControlTransport, TransportDeviceInfo};
use tracing::debug;

/// Encode `command` and write every frame in order through `transport`.
pub async fn submit(
    command: &Command,
    transport: &FlowControlTransport,
) -> Result<(), KeyboardError> {
    let frames = encode(command)?;
    debug!("{} -> {} frames", command.name(), frames.len());
    match command {
        // The picture is a thousand frames; the default pause would take seconds
        Command::SendImage(_) => {
            transport
                .write_with_delay(&frames, Duration::from_millis(timing::STREAM_FRAME_DELAY_MS))
                .await?
        }
        _ => transport.write(&frames).await?,
    }
    Ok(())
}

/// High-level keyboard interface using any transport
pub struct Keyboard {
    transport: Arc<FlowControlTransport>,
}

impl Keyboard {
    /// Create a new keyboard interface
    pub fn new(transport: Arc<FlowControlTransport>) -> Self {
        Self { transport }
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &Arc<FlowControlTransport> {
        &self.transport
    }

    pub fn device_info(&self) -> &TransportDeviceInfo {
        self.transport.device_info()
    }

    /// Send any command
    pub async fn submit(&self, command: &Command) -> Result<(), KeyboardError> {
        submit(command, &self.transport).await
    }

    /// Release the device; later commands fail with a disconnect
    pub async fn close(&self) -> Result<(), KeyboardError> {
        Ok(self.transport.close().await?)
    }

    /// Last acknowledgement reported by the device
    pub async fn status(&self) -> Result<DeviceStatus, KeyboardError> {
        Ok(self.transport.read_status().await?)
    }

    /// Light every key with a built-in pattern
    pub async fn set_light_profile(&self, profile: LightProfile) -> Result<(), KeyboardError> {
        self.submit(&Command::set_light_profile(profile)).await
    }

    /// Static per-key colors
    pub async fn set_key_colors(&self, colors: &KeyColorMap) -> Result<(), KeyboardError> {
        self.submit(&Command::set_key_colors(colors)?).await
    }

    /// Per-key animation; each map is shown for its time in milliseconds
    pub async fn set_key_frames(&self, frames: &[(KeyColorMap, u8)]) -> Result<(), KeyboardError> {
        self.submit(&Command::set_key_frames(frames)?).await
    }

    /// Every key one static color
    pub async fn set_all_keys_color(&self, color: RgbColor) -> Result<(), KeyboardError> {
        self.set_key_colors(&KeyColorMap::all(color)).await
    }

    /// Convert and upload a picture to the display
    pub async fn upload_image(&self, img: &image::DynamicImage) -> Result<(), KeyboardError> {
        self.submit(&Command::send_image(convert(img))?).await
    }

    pub async fn send_cpu(&self, percent: i64) -> Result<(), KeyboardError> {
        self.submit(&Command::send_numeric(NumericKind::Cpu, percent)?)
            .await
    }

    pub async fn send_temperature(&self, celsius: i64) -> Result<(), KeyboardError> {
        self.submit(&Command::send_numeric(NumericKind::Temperature, celsius)?)
            .await
    }

    pub async fn send_time(&self, timestamp: Timestamp) -> Result<(), KeyboardError> {
        self.submit(&Command::send_time(timestamp)).await
    }

    /// Switch to the pattern after `current`; returns the new one
    pub async fn cycle_light_mode(&self, current: LightMode) -> Result<LightMode, KeyboardError> {
        self.submit(&Command::cycle_light_mode(current)).await?;
        Ok(current.next())
    }

    pub async fn clear_screen(&self) -> Result<(), KeyboardError> {
        self.submit(&Command::clear_screen()).await
    }

    pub async fn remap_key(&self, key: &str, hid_code: u8) -> Result<(), KeyboardError> {
        self.submit(&Command::remap_key(key, hid_code)?).await
    }
}

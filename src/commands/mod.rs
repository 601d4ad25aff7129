//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `display`: Screen commands (upload-image, send-time, send-cpu, send-temperature, clear-screen)
//! - `lighting`: LED commands (set-rgb-all-keys, set-keys, set-light-mode, cycle-light-modes)
//! - `keymap`: Key commands (remap-key, show-keymap)
//! - `daemon`: Background updater (start-daemon, list-temp-devices)
//! - `utility`: Utility commands (list)

pub mod daemon;
pub mod display;
pub mod keymap;
pub mod lighting;
pub mod utility;

use std::sync::Arc;

use anyhow::Context;
use epomaker_driver::Config;
use epomaker_keyboard::Keyboard;
use epomaker_transport::{FlowControlTransport, HidDiscovery, RecordingTransport, Transport};
use tracing::info;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Open the keyboard named by `config`, or a recording stand-in for dry runs.
pub async fn open_keyboard(config: &Config) -> anyhow::Result<Keyboard> {
    let transport: Arc<dyn Transport> = if config.dry_run {
        info!("Dry run: frames are logged at debug level, nothing is sent");
        Arc::new(RecordingTransport::new())
    } else {
        HidDiscovery::new()
            .open(config.interface_number)
            .await
            .with_context(|| format!("opening interface {}", config.interface_number))?
    };
    let flow = FlowControlTransport::new(transport).with_frame_delay(config.frame_delay());
    Ok(Keyboard::new(Arc::new(flow)))
}

/// Parse a byte written as decimal or `0x`-prefixed hex
pub fn parse_byte(s: &str) -> anyhow::Result<u8> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.with_context(|| format!("'{s}' is not a value in 0..=255"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_byte() {
        assert_eq!(parse_byte("4").unwrap(), 4);
        assert_eq!(parse_byte("0x2A").unwrap(), 0x2A);
        assert_eq!(parse_byte(" 0xff ").unwrap(), 255);
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0xZZ").is_err());
    }

    #[tokio::test]
    async fn test_dry_run_opens_without_hardware() {
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        let keyboard = open_keyboard(&config).await.unwrap();
        assert_eq!(keyboard.device_info().device_path, "dry-run");
        keyboard.clear_screen().await.unwrap();
    }
}

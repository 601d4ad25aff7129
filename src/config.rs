//! Driver configuration
//!
//! Stored as TOML at `~/.config/epomaker/config.toml`. Every field has a
//! default, so a missing file or a partial one both load; command-line flags
//! override whatever the file says.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use epomaker_transport::protocol::{device, timing};
use epomaker_transport::validate_interface;

use crate::daemon::DaemonConfig;

/// Daemon section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    /// Seconds between CPU/temperature updates
    pub interval_seconds: u64,
    /// Temperature sensor key, e.g. `coretemp-0`
    pub temp_key: Option<String>,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 1,
            temp_key: None,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// USB interface used for vendor commands (0, 1 or 2)
    pub interface_number: i32,
    /// Pause between report frames in milliseconds
    pub frame_delay_ms: u64,
    /// Log frames instead of writing them
    pub dry_run: bool,
    pub daemon: DaemonSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface_number: device::DEFAULT_INTERFACE,
            frame_delay_ms: timing::DEFAULT_FRAME_DELAY_MS,
            dry_run: false,
            daemon: DaemonSettings::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("epomaker")
            .join("config.toml")
    }

    /// Load from the default path
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a file, or return default if not found
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the driver cannot use
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_interface(self.interface_number)?;
        if self.daemon.interval_seconds == 0 {
            anyhow::bail!("daemon.interval_seconds must be at least 1");
        }
        Ok(())
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    /// Settings the scheduler runs with
    pub fn daemon_config(&self) -> DaemonConfig {
        DaemonConfig {
            interval: Duration::from_secs(self.daemon.interval_seconds.max(1)),
            sensor_label: self.daemon.temp_key.clone(),
            interface_number: self.interface_number,
        }
    }
}

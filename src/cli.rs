// CLI definitions using clap

use clap::{Parser, Subcommand};
use epomaker_keyboard::Direction;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "epomaker_driver")]
#[command(author, version, about = "Epomaker RT100 Linux Driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log frames instead of writing them to the keyboard
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// USB interface for vendor commands (0, 1 or 2)
    #[arg(short, long, global = true)]
    pub interface: Option<i32>,

    /// Config file path (default: ~/.config/epomaker/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Display Commands ===
    /// Upload a picture to the display (any size; cropped to 162x173)
    #[command(visible_aliases = ["image", "img"])]
    UploadImage {
        /// Image file (PNG or JPEG)
        path: PathBuf,
        /// Also write the converted picture to this PNG
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Set the display clock to the current local time
    #[command(visible_alias = "time")]
    SendTime,

    /// Show a CPU usage percentage on the display
    #[command(visible_alias = "cpu")]
    SendCpu {
        /// Usage in percent (0-100)
        cpu: i64,
    },

    /// Show a temperature on the display
    #[command(visible_alias = "temp")]
    SendTemperature {
        /// Temperature in °C (0-100)
        temperature: i64,
    },

    /// Blank the display
    #[command(visible_alias = "clear")]
    ClearScreen,

    // === Lighting Commands ===
    /// Light every key with one static color
    #[command(visible_aliases = ["all-keys", "rgb"])]
    SetRgbAllKeys {
        /// Red (0-255)
        r: u8,
        /// Green (0-255)
        g: u8,
        /// Blue (0-255)
        b: u8,
    },

    /// Set individual key colors, optionally as an animation
    #[command(visible_alias = "keys")]
    SetKeys {
        /// KEY=RRGGBB pairs, e.g. ESC=ff0000 NUMPAD_ENTER=00ff00; a lone "/"
        /// starts the next animation frame
        #[arg(required = true)]
        assignments: Vec<String>,
        /// Milliseconds each animation frame is shown
        #[arg(long, default_value = "0")]
        time_ms: u8,
    },

    /// Select a built-in lighting pattern
    #[command(visible_aliases = ["mode", "m"])]
    SetLightMode {
        /// Mode name or number (see --list)
        #[arg(required_unless_present = "list")]
        mode: Option<String>,
        /// Animation speed (0-5)
        #[arg(short, long, default_value = "4")]
        speed: u8,
        /// Brightness (0-4)
        #[arg(short, long, default_value = "4")]
        brightness: u8,
        /// Color as RRGGBB
        #[arg(long, default_value = "ffffff")]
        color: String,
        /// Rainbow colors instead of --color
        #[arg(long)]
        dazzle: bool,
        /// Direction of moving patterns (right, left, down, up)
        #[arg(long, default_value = "right", value_parser = parse_direction)]
        direction: Direction,
        /// List available modes
        #[arg(long)]
        list: bool,
    },

    /// Step through every lighting pattern
    #[command(visible_alias = "cycle")]
    CycleLightModes {
        /// Seconds to stay on each mode
        #[arg(short, long, default_value = "5")]
        delay: u64,
    },

    // === Key Commands ===
    /// Rebind a key to a USB HID usage code
    #[command(visible_alias = "remap")]
    RemapKey {
        /// Key name (see show-keymap)
        key: String,
        /// HID usage code, decimal or 0x-prefixed hex
        hid_code: String,
    },

    /// Show key names and LED indices
    #[command(visible_alias = "keymap")]
    ShowKeymap {
        /// Only keys whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    // === Daemon Commands ===
    /// Push CPU usage and a temperature to the display until interrupted
    #[command(visible_alias = "daemon")]
    StartDaemon {
        /// Temperature sensor key (see list-temp-devices)
        temp_key: Option<String>,
        /// Seconds between updates
        #[arg(long)]
        interval: Option<u64>,
        /// Send random values instead of real readings
        #[arg(long)]
        test: bool,
    },

    /// List temperature sensors usable with start-daemon
    #[command(visible_alias = "sensors")]
    ListTempDevices,

    // === Utility Commands ===
    /// List connected keyboards and their interfaces
    #[command(visible_alias = "ls")]
    List,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    Direction::parse(s).ok_or_else(|| format!("'{s}' is not one of right, left, down, up"))
}

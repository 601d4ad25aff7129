//! Protocol constants and utilities for Epomaker RT100 communication

/// Vendor command codes (byte 0 of every report)
pub mod cmd {
    pub const REMAP_KEY: u8 = 0x13;
    pub const SET_LIGHT_PROFILE: u8 = 0x07;
    pub const KEY_RGB_START: u8 = 0x18;
    pub const KEY_RGB_DATA: u8 = 0x19;
    pub const CPU_DISPLAY: u8 = 0x22;
    pub const IMAGE_DATA: u8 = 0x25;
    pub const TIME_DISPLAY: u8 = 0x28;
    pub const TEMP_DISPLAY: u8 = 0x2A;
    pub const IMAGE_START: u8 = 0xA5;
    pub const CLEAR_SCREEN: u8 = 0xAC;

    // Response status
    pub const STATUS_SUCCESS: u8 = 0xAA;

    /// Get human-readable name for command byte
    pub fn name(cmd: u8) -> &'static str {
        match cmd {
            REMAP_KEY => "REMAP_KEY",
            SET_LIGHT_PROFILE => "SET_LIGHT_PROFILE",
            KEY_RGB_START => "KEY_RGB_START",
            KEY_RGB_DATA => "KEY_RGB_DATA",
            CPU_DISPLAY => "CPU_DISPLAY",
            IMAGE_DATA => "IMAGE_DATA",
            TIME_DISPLAY => "TIME_DISPLAY",
            TEMP_DISPLAY => "TEMP_DISPLAY",
            IMAGE_START => "IMAGE_START",
            CLEAR_SCREEN => "CLEAR_SCREEN",
            STATUS_SUCCESS => "STATUS_SUCCESS",
            _ => "UNKNOWN",
        }
    }
}

/// Feature report size on the wire; the command code is byte 0
pub const REPORT_SIZE: usize = 64;

/// Header of a single-report command: the command code and six zero bytes
pub const SHORT_HEADER_LEN: usize = 7;

/// Header length of a streamed data report, checksum included
pub const DATA_HEADER_LEN: usize = 8;

/// Bytes of data carried by one streamed report
pub const DATA_CAPACITY: usize = REPORT_SIZE - DATA_HEADER_LEN;

/// Highest number of reports one streamed transfer can address
pub const MAX_FRAMES: usize = u16::MAX as usize;

/// Timing constants
pub mod timing {
    /// Retries for one frame after the first attempt fails
    pub const SEND_RETRIES: usize = 3;
    /// First retry backoff; doubled on each further attempt
    pub const RETRY_BACKOFF_MS: u64 = 50;
    /// Default pause between consecutive frames
    pub const DEFAULT_FRAME_DELAY_MS: u64 = 10;
    /// Pause used by large streaming transfers (images)
    pub const STREAM_FRAME_DELAY_MS: u64 = 2;
}

/// Device identifiers
pub mod device {
    /// Epomaker vendor ID (shared with other Chinese OEM keyboards)
    pub const VENDOR_ID: u16 = 0x3151;
    /// RT100 wired
    pub const PID_RT100: u16 = 0x4010;
    /// RT100 wired (later revision)
    pub const PID_RT100_REV2: u16 = 0x4015;

    /// Interface that receives vendor commands without disturbing typing
    pub const DEFAULT_INTERFACE: i32 = 2;
    /// Interface carrying the regular keyboard endpoint
    pub const KEYBOARD_INTERFACE: i32 = 0;
    /// All interfaces that accept feature reports
    pub const INTERFACES: [i32; 3] = [0, 1, 2];
}

/// Checksum over the header bytes that precede it.
///
/// `0xFF - (sum & 0xFF)`; data after the checksum is not covered.
pub fn calculate_checksum(header: &[u8]) -> u8 {
    let sum: u32 = header.iter().map(|&b| b as u32).sum();
    0xFF - (sum & 0xFF) as u8
}

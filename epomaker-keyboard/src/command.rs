//! Keyboard commands
//!
//! A [`Command`] is a validated request for the keyboard. All checks happen
//! in the constructors, so anything that reaches the encoder is known-good
//! and nothing is sent for bad input.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike};

use crate::bitmap::Bitmap;
use crate::error::ValidationError;
use crate::layout::{self, Key, LED_SLOTS};
use crate::led::{LightMode, LightProfile, RgbColor, BRIGHTNESS_DEFAULT};

/// Highest value the numeric displays accept
pub const NUMERIC_MAX: u8 = 100;

/// Earliest year the clock accepts
pub const YEAR_MIN: u16 = 1970;
/// Latest year the clock accepts
pub const YEAR_MAX: u16 = 2099;

/// Most animation frames one per-key transfer can carry
pub const MAX_KEY_FRAMES: usize = u8::MAX as usize;

/// Requested colors per key name, at most one entry per key.
///
/// Names are not checked here; [`Command::set_key_colors`] rejects any name
/// missing from the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyColorMap {
    entries: BTreeMap<String, RgbColor>,
}

impl KeyColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key's color, replacing an earlier entry for the same key
    pub fn insert(&mut self, key: &str, color: RgbColor) -> Option<RgbColor> {
        self.entries.insert(key.trim().to_ascii_uppercase(), color)
    }

    /// Every layout key set to one color
    pub fn all(color: RgbColor) -> Self {
        let mut map = Self::new();
        for key in layout::rt100().keys() {
            map.insert(key.name(), color);
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<RgbColor> {
        self.entries.get(&key.trim().to_ascii_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, RgbColor)> {
        self.entries.iter().map(|(k, c)| (k.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, RgbColor)> for KeyColorMap {
    fn from_iter<I: IntoIterator<Item = (String, RgbColor)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, color) in iter {
            map.insert(&key, color);
        }
        map
    }
}

/// Key colors resolved against the layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyColors {
    entries: Vec<(Key, RgbColor)>,
}

impl KeyColors {
    pub fn entries(&self) -> &[(Key, RgbColor)] {
        &self.entries
    }

    /// Color of every LED slot, black where unset
    pub fn slots(&self) -> [RgbColor; LED_SLOTS] {
        let mut slots = [RgbColor::BLACK; LED_SLOTS];
        for (key, color) in &self.entries {
            slots[key.led_index() as usize] = *color;
        }
        slots
    }
}

/// One animation frame of per-key colors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFrame {
    colors: KeyColors,
    time_ms: u8,
}

impl KeyFrame {
    pub fn colors(&self) -> &KeyColors {
        &self.colors
    }

    /// How long the firmware shows this frame
    pub fn time_ms(&self) -> u8 {
        self.time_ms
    }
}

/// Which number the display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    /// CPU load in percent
    Cpu,
    /// Temperature in degrees Celsius
    Temperature,
}

impl NumericKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Temperature => "temperature",
        }
    }
}

/// A value for one of the numeric displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericDisplay {
    kind: NumericKind,
    value: u8,
}

impl NumericDisplay {
    /// Accept `value` only within 0..=100
    pub fn new(kind: NumericKind, value: i64) -> Result<Self, ValidationError> {
        if !(0..=NUMERIC_MAX as i64).contains(&value) {
            return Err(ValidationError::out_of_range(
                kind.name(),
                value,
                0,
                NUMERIC_MAX as i64,
            ));
        }
        Ok(Self {
            kind,
            value: value as u8,
        })
    }

    /// Round a sampled reading and clamp it into range.
    ///
    /// Returns the display and whether clamping changed the value. NaN maps
    /// to zero.
    pub fn clamped(kind: NumericKind, reading: f32) -> (Self, bool) {
        let rounded = if reading.is_nan() { 0.0 } else { reading.round() };
        let value = rounded.clamp(0.0, NUMERIC_MAX as f32);
        (
            Self {
                kind,
                value: value as u8,
            },
            value != rounded,
        )
    }

    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}

/// Wall-clock time for the display clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl Timestamp {
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ValidationError> {
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(ValidationError::InvalidTimestamp(format!(
                "year {year} outside {YEAR_MIN}..={YEAR_MAX}"
            )));
        }
        if NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).is_none() {
            return Err(ValidationError::InvalidTimestamp(format!(
                "no such date {year:04}-{month:02}-{day:02}"
            )));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ValidationError::InvalidTimestamp(format!(
                "no such time {hour:02}:{minute:02}:{second:02}"
            )));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Take the fields of any chrono date-time (leap seconds fold into :59)
    pub fn from_datetime<T: Datelike + Timelike>(dt: &T) -> Result<Self, ValidationError> {
        let year = u16::try_from(dt.year()).map_err(|_| {
            ValidationError::InvalidTimestamp(format!("year {} outside u16", dt.year()))
        })?;
        Self::new(
            year,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second().min(59) as u8,
        )
    }

    /// Current local time
    pub fn now_local() -> Result<Self, ValidationError> {
        Self::from_datetime(&chrono::Local::now())
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// `[month, day, hour, minute, second]`
    pub fn fields(&self) -> [u8; 5] {
        [self.month, self.day, self.hour, self.minute, self.second]
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Rebind one key to a USB HID usage code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRemap {
    key: Key,
    hid_code: u8,
}

impl KeyRemap {
    pub fn key(&self) -> Key {
        self.key
    }

    pub fn hid_code(&self) -> u8 {
        self.hid_code
    }
}

fn resolve(colors: &KeyColorMap) -> Result<KeyColors, ValidationError> {
    let layout = layout::rt100();
    let entries = colors
        .iter()
        .map(|(name, color)| {
            layout
                .key(name)
                .map(|key| (key, color))
                .ok_or_else(|| ValidationError::UnknownKey(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(KeyColors { entries })
}

/// Everything the keyboard can be told to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Apply a built-in lighting pattern to all keys
    SetAllRgb(LightProfile),
    /// Per-key colors, one entry per animation frame
    SetKeyColor(Vec<KeyFrame>),
    /// Picture for the display
    SendImage(Bitmap),
    /// CPU load or temperature readout
    SendNumericDisplay(NumericDisplay),
    /// Set the display clock
    SendTime(Timestamp),
    /// Switch to the pattern after the current one
    CycleLightMode(LightProfile),
    /// Blank the display
    ClearScreen,
    /// Rebind a key
    RemapKey(KeyRemap),
}

impl Command {
    /// All keys lit with a built-in pattern.
    ///
    /// `pattern_id` is the firmware mode number; `color` defaults to white.
    pub fn set_all_rgb(
        pattern_id: u8,
        speed: u8,
        color: Option<RgbColor>,
    ) -> Result<Self, ValidationError> {
        let mode = LightMode::try_from(pattern_id)?;
        let profile = LightProfile::new(
            mode,
            speed,
            BRIGHTNESS_DEFAULT,
            color.unwrap_or(RgbColor::WHITE),
        )?;
        Ok(Self::SetAllRgb(profile))
    }

    /// Full control over the lighting profile
    pub fn set_light_profile(profile: LightProfile) -> Self {
        Self::SetAllRgb(profile)
    }

    /// Static per-key colors; every key must exist in the layout
    pub fn set_key_colors(colors: &KeyColorMap) -> Result<Self, ValidationError> {
        Self::set_key_frames(&[(colors.clone(), 0)])
    }

    /// Per-key animation: each map is shown for its `time_ms`
    pub fn set_key_frames(frames: &[(KeyColorMap, u8)]) -> Result<Self, ValidationError> {
        if frames.is_empty() || frames.len() > MAX_KEY_FRAMES {
            return Err(ValidationError::out_of_range(
                "frames",
                frames.len() as i64,
                1,
                MAX_KEY_FRAMES as i64,
            ));
        }
        frames
            .iter()
            .map(|(map, time_ms)| {
                Ok(KeyFrame {
                    colors: resolve(map)?,
                    time_ms: *time_ms,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()
            .map(Self::SetKeyColor)
    }

    /// Send a converted display picture
    pub fn send_image(bitmap: Bitmap) -> Result<Self, ValidationError> {
        let expected = crate::bitmap::PIXEL_COUNT;
        if bitmap.len() != expected {
            return Err(ValidationError::WrongResolution {
                got: bitmap.len() * 2,
                expected: expected * 2,
            });
        }
        Ok(Self::SendImage(bitmap))
    }

    /// Show a number (0..=100) on the CPU or temperature readout
    pub fn send_numeric(kind: NumericKind, value: i64) -> Result<Self, ValidationError> {
        Ok(Self::SendNumericDisplay(NumericDisplay::new(kind, value)?))
    }

    pub fn send_time(timestamp: Timestamp) -> Self {
        Self::SendTime(timestamp)
    }

    /// Move from `current` to the next pattern with default settings
    pub fn cycle_light_mode(current: LightMode) -> Self {
        Self::CycleLightMode(LightProfile::cycle_defaults(current.next()))
    }

    pub fn clear_screen() -> Self {
        Self::ClearScreen
    }

    /// Rebind `key` to the USB HID usage `hid_code`
    pub fn remap_key(key: &str, hid_code: u8) -> Result<Self, ValidationError> {
        let key = layout::rt100()
            .key(key)
            .ok_or_else(|| ValidationError::UnknownKey(key.to_string()))?;
        Ok(Self::RemapKey(KeyRemap { key, hid_code }))
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetAllRgb(_) => "SetAllRgb",
            Self::SetKeyColor(_) => "SetKeyColor",
            Self::SendImage(_) => "SendImage",
            Self::SendNumericDisplay(_) => "SendNumericDisplay",
            Self::SendTime(_) => "SendTime",
            Self::CycleLightMode(_) => "CycleLightMode",
            Self::ClearScreen => "ClearScreen",
            Self::RemapKey(_) => "RemapKey",
        }
    }
}

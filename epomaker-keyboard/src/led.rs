//! LED and RGB lighting types and utilities

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::ValidationError;

/// Maximum brightness value (5 levels: 0-4)
pub const BRIGHTNESS_MAX: u8 = 4;

/// Default brightness
pub const BRIGHTNESS_DEFAULT: u8 = 4;

/// Maximum speed value (6 levels: 0-5)
pub const SPEED_MAX: u8 = 5;

/// Default speed
pub const SPEED_DEFAULT: u8 = 4;

/// Option bits for dazzle (rainbow) mode off
pub const DAZZLE_OFF: u8 = 0x07;

/// Option bits for dazzle (rainbow) mode on
pub const DAZZLE_ON: u8 = 0x08;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Create a new RGB color
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` or `#RRGGBB`
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Black (all LEDs off)
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    /// White (all LEDs full)
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Soft white used when cycling through modes
    pub const CYCLE: Self = Self {
        r: 180,
        g: 180,
        b: 180,
    };
    /// Red
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    /// Green
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };
    /// Blue
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };
}

impl std::fmt::Display for RgbColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Built-in lighting pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LightMode {
    AlwaysOn = 0x01,
    DynamicBreathing = 0x02,
    SpectrumCycle = 0x03,
    Drift = 0x04,
    WavesRipple = 0x05,
    StarsTwinkle = 0x06,
    SteadyStream = 0x07,
    Shadowing = 0x08,
    PeaksRising = 0x09,
    SineWave = 0x0A,
    CaispringSurging = 0x0B,
    FlowersBlooming = 0x0C,
    Laser = 0x0E,
    PeakTurn = 0x0F,
    InclinedRain = 0x10,
    Snow = 0x11,
    Meteor = 0x12,
    ThroughTheSnow = 0x13,
    LightShadow = 0x15,
}

impl LightMode {
    /// Every pattern, in firmware order
    pub const ALL: [LightMode; 19] = [
        Self::AlwaysOn,
        Self::DynamicBreathing,
        Self::SpectrumCycle,
        Self::Drift,
        Self::WavesRipple,
        Self::StarsTwinkle,
        Self::SteadyStream,
        Self::Shadowing,
        Self::PeaksRising,
        Self::SineWave,
        Self::CaispringSurging,
        Self::FlowersBlooming,
        Self::Laser,
        Self::PeakTurn,
        Self::InclinedRain,
        Self::Snow,
        Self::Meteor,
        Self::ThroughTheSnow,
        Self::LightShadow,
    ];

    /// Get mode from numeric value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| *m as u8 == value)
    }

    /// Parse a mode from its display name or numeric value
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u8::from_str_radix(hex, 16).ok().and_then(Self::from_u8);
        }
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_u8(n);
        }
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL.iter().copied().find(|m| {
            m.name()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
                == wanted
        })
    }

    /// The pattern after this one, wrapping at the end
    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    /// Highest speed accepted by this mode
    pub fn max_speed(self) -> u8 {
        SPEED_MAX
    }

    /// Get the display name for this mode
    pub fn name(&self) -> &'static str {
        match self {
            Self::AlwaysOn => "Always On",
            Self::DynamicBreathing => "Dynamic Breathing",
            Self::SpectrumCycle => "Spectrum Cycle",
            Self::Drift => "Drift",
            Self::WavesRipple => "Waves Ripple",
            Self::StarsTwinkle => "Stars Twinkle",
            Self::SteadyStream => "Steady Stream",
            Self::Shadowing => "Shadowing",
            Self::PeaksRising => "Peaks Rising",
            Self::SineWave => "Sine Wave",
            Self::CaispringSurging => "Caispring Surging",
            Self::FlowersBlooming => "Flowers Blooming",
            Self::Laser => "Laser",
            Self::PeakTurn => "Peak Turn",
            Self::InclinedRain => "Inclined Rain",
            Self::Snow => "Snow",
            Self::Meteor => "Meteor",
            Self::ThroughTheSnow => "Through The Snow",
            Self::LightShadow => "Light Shadow",
        }
    }
}

impl TryFrom<u8> for LightMode {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(ValidationError::UnsupportedPattern(value))
    }
}

/// Direction bits for moving patterns, stored in the option byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    #[default]
    Right = 0x00,
    Left = 0x10,
    Down = 0x20,
    Up = 0x30,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Right, Self::Left, Self::Down, Self::Up];

    /// Parse `right`, `left`, `down` or `up` (any case)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(s))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

/// SET_LIGHT_PROFILE (0x07) payload - 7 bytes.
///
/// Fields are private; construct with [`LightProfile::new`] so speed and
/// brightness are range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LightProfile {
    mode: u8,
    speed: u8,
    brightness: u8,
    option: u8,
    r: u8,
    g: u8,
    b: u8,
}

impl LightProfile {
    /// Create a profile with dazzle off and the default direction
    pub fn new(
        mode: LightMode,
        speed: u8,
        brightness: u8,
        color: RgbColor,
    ) -> Result<Self, ValidationError> {
        if speed > mode.max_speed() {
            return Err(ValidationError::out_of_range(
                "speed",
                speed as i64,
                0,
                mode.max_speed() as i64,
            ));
        }
        if brightness > BRIGHTNESS_MAX {
            return Err(ValidationError::out_of_range(
                "brightness",
                brightness as i64,
                0,
                BRIGHTNESS_MAX as i64,
            ));
        }
        Ok(Self {
            mode: mode as u8,
            speed,
            brightness,
            option: DAZZLE_OFF,
            r: color.r,
            g: color.g,
            b: color.b,
        })
    }

    /// Defaults used when stepping through modes
    pub fn cycle_defaults(mode: LightMode) -> Self {
        Self {
            mode: mode as u8,
            speed: SPEED_DEFAULT,
            brightness: BRIGHTNESS_DEFAULT,
            option: DAZZLE_OFF,
            r: RgbColor::CYCLE.r,
            g: RgbColor::CYCLE.g,
            b: RgbColor::CYCLE.b,
        }
    }

    /// Enable or disable rainbow colors
    pub fn with_dazzle(mut self, on: bool) -> Self {
        let direction = self.option & 0xF0;
        self.option = direction | if on { DAZZLE_ON } else { DAZZLE_OFF };
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.option = (self.option & 0x0F) | direction as u8;
        self
    }

    pub fn mode(&self) -> LightMode {
        LightMode::from_u8(self.mode).unwrap_or(LightMode::AlwaysOn)
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn dazzle(&self) -> bool {
        self.option & 0x0F == DAZZLE_ON
    }

    pub fn color(&self) -> RgbColor {
        RgbColor::new(self.r, self.g, self.b)
    }
}

//! Core data types for the iambic keyer

use core::fmt;

/// Lowest accepted keying speed
pub const MIN_WPM: u32 = 1;
/// Highest accepted keying speed
pub const MAX_WPM: u32 = 60;
/// Weight at which a dash is exactly three dots
pub const NOMINAL_WEIGHT: u32 = 50;
/// Accepted weight range (percent)
pub const WEIGHT_RANGE: core::ops::RangeInclusive<u32> = 1..=100;
/// Accepted sidetone range (Hz)
pub const SIDETONE_RANGE: core::ops::RangeInclusive<u32> = 100..=4000;

/// Morse code elements
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Element {
    /// Short element
    Dot,
    /// Long element
    Dash,
}

impl Element {
    /// Returns the opposite element (Dot <-> Dash)
    pub const fn opposite(&self) -> Element {
        match self {
            Element::Dot => Element::Dash,
            Element::Dash => Element::Dot,
        }
    }

    /// Printable symbol for this element
    pub const fn symbol(&self) -> char {
        match self {
            Element::Dot => '.',
            Element::Dash => '-',
        }
    }
}

/// Keyer operating modes
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyerMode {
    /// Straight key on the dash paddle, automatic dots on the dot paddle (bug)
    Straight,
    /// Iambic A: the opposite paddle is also watched while sending, and a release drops it
    #[default]
    IambicA,
    /// Iambic B: the opposite paddle is remembered only between elements
    IambicB,
}

impl KeyerMode {
    /// Returns true if every paddle transition, not only presses, should wake the engine
    pub const fn wakes_on_release(&self) -> bool {
        matches!(self, KeyerMode::Straight)
    }
}

impl TryFrom<u8> for KeyerMode {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(KeyerMode::Straight),
            1 => Ok(KeyerMode::IambicA),
            2 => Ok(KeyerMode::IambicB),
            other => Err(ConfigError::InvalidMode(other)),
        }
    }
}

impl From<KeyerMode> for u8 {
    fn from(mode: KeyerMode) -> u8 {
        match mode {
            KeyerMode::Straight => 0,
            KeyerMode::IambicA => 1,
            KeyerMode::IambicB => 2,
        }
    }
}

/// Physical paddle side
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaddleSide {
    /// Left contact (dot unless reversed)
    Left,
    /// Right contact (dash unless reversed)
    Right,
}

impl PaddleSide {
    /// Returns the opposite paddle side
    pub const fn opposite(&self) -> PaddleSide {
        match self {
            PaddleSide::Left => PaddleSide::Right,
            PaddleSide::Right => PaddleSide::Left,
        }
    }
}

/// Configuration validation failures
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Speed outside 1..=60 WPM
    InvalidSpeed(u32),
    /// Weight outside the accepted range
    InvalidWeight(u32),
    /// Sidetone outside the accepted range
    InvalidSidetone(u32),
    /// Mode number other than 0, 1 or 2
    InvalidMode(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSpeed(wpm) => {
                write!(f, "speed {} WPM outside {}..={}", wpm, MIN_WPM, MAX_WPM)
            }
            ConfigError::InvalidWeight(weight) => write!(
                f,
                "weight {} outside {}..={}",
                weight,
                WEIGHT_RANGE.start(),
                WEIGHT_RANGE.end()
            ),
            ConfigError::InvalidSidetone(hz) => write!(
                f,
                "sidetone {} Hz outside {}..={}",
                hz,
                SIDETONE_RANGE.start(),
                SIDETONE_RANGE.end()
            ),
            ConfigError::InvalidMode(mode) => {
                write!(f, "mode {} is not 0 (straight), 1 (iambic A) or 2 (iambic B)", mode)
            }
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for ConfigError {}

/// Keyer configuration parameters, fixed for the lifetime of a run
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyerConfig {
    /// Speed in words per minute (PARIS)
    pub wpm: u32,
    /// Dash weighting in percent, 50 is a 3:1 dash
    pub weight: u32,
    /// Operating mode
    pub mode: KeyerMode,
    /// Enforce a three-dot gap between characters
    pub letter_space: bool,
    /// Swap the left and right paddle functions
    pub paddles_reversed: bool,
    /// Sidetone frequency in Hz
    pub sidetone_hz: u32,
}

impl Default for KeyerConfig {
    fn default() -> Self {
        Self {
            wpm: 20,
            weight: NOMINAL_WEIGHT,
            mode: KeyerMode::IambicA,
            letter_space: false,
            paddles_reversed: false,
            sidetone_hz: 800,
        }
    }
}

impl KeyerConfig {
    /// Create a new configuration with validation
    pub fn new(
        wpm: u32,
        weight: u32,
        mode: KeyerMode,
        letter_space: bool,
        paddles_reversed: bool,
        sidetone_hz: u32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            wpm,
            weight,
            mode,
            letter_space,
            paddles_reversed,
            sidetone_hz,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its accepted range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WPM..=MAX_WPM).contains(&self.wpm) {
            return Err(ConfigError::InvalidSpeed(self.wpm));
        }
        if !WEIGHT_RANGE.contains(&self.weight) {
            return Err(ConfigError::InvalidWeight(self.weight));
        }
        if !SIDETONE_RANGE.contains(&self.sidetone_hz) {
            return Err(ConfigError::InvalidSidetone(self.sidetone_hz));
        }
        Ok(())
    }

    /// Same configuration with a different mode
    pub const fn with_mode(mut self, mode: KeyerMode) -> Self {
        self.mode = mode;
        self
    }

    /// Same configuration at a different speed
    pub const fn with_wpm(mut self, wpm: u32) -> Self {
        self.wpm = wpm;
        self
    }
}

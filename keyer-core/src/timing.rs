//! Element durations and paddle mapping derived from the configuration

use crate::types::{KeyerConfig, PaddleSide, NOMINAL_WEIGHT};

/// Length of one engine evaluation period in milliseconds.
/// All durations below are counted in these ticks.
pub const TICK_MS: u64 = 1;

/// Which physical paddle drives which element
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaddleMapping {
    /// Paddle that sends dots
    pub dot: PaddleSide,
    /// Paddle that sends dashes
    pub dash: PaddleSide,
}

impl PaddleMapping {
    /// Left = dot, right = dash, swapped when `reversed`
    pub const fn new(reversed: bool) -> Self {
        if reversed {
            Self { dot: PaddleSide::Right, dash: PaddleSide::Left }
        } else {
            Self { dot: PaddleSide::Left, dash: PaddleSide::Right }
        }
    }
}

impl Default for PaddleMapping {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Precomputed element durations in ticks
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyerTiming {
    /// Dot length, also the inter-element gap
    pub dot: u32,
    /// Dash length, scaled by weight
    pub dash: u32,
    /// Resolved paddle functions
    pub mapping: PaddleMapping,
}

impl KeyerTiming {
    /// Derive durations from a validated configuration.
    ///
    /// `dot = 1200 / wpm`, `dash = dot * 3 * weight / 50`. Weight never
    /// touches the dot.
    pub const fn from_config(config: &KeyerConfig) -> Self {
        let dot = dot_duration(config.wpm);
        Self {
            dot,
            dash: dash_duration(dot, config.weight),
            mapping: PaddleMapping::new(config.paddles_reversed),
        }
    }

    /// Extra ticks a letter space adds after the trailing element gap
    pub const fn letter_space_extension(&self) -> u32 {
        2 * self.dot
    }

    /// Full inter-character gap (element gap plus extension)
    pub const fn letter_gap(&self) -> u32 {
        self.dot + self.letter_space_extension()
    }
}

/// PARIS dot length in milliseconds; `wpm` must be non-zero
pub const fn dot_duration(wpm: u32) -> u32 {
    1200 / wpm
}

/// Weighted dash length in milliseconds
pub const fn dash_duration(dot: u32, weight: u32) -> u32 {
    dot * 3 * weight / NOMINAL_WEIGHT
}

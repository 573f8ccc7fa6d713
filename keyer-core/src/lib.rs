#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Keyer Core
//!
//! Iambic keyer timing engine for embedded and host targets.
//! Straight/bug, Iambic A and Iambic B keying with dot/dash memory,
//! weighting, automatic letter spacing and paddle reversal.

pub mod types;
pub mod timing;
pub mod controller;
pub mod fsm;
pub mod hal;
pub mod task;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use timing::*;
pub use controller::*;
pub use fsm::*;
pub use hal::*;
pub use task::*;

/// Keyer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration: 20 WPM Iambic A, no letter spacing, 800 Hz
pub fn default_config() -> KeyerConfig {
    KeyerConfig::default()
}

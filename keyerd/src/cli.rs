//! Command line surface

use std::path::PathBuf;

use clap::Parser;
use keyer_core::{ConfigError, KeyerConfig, KeyerMode};

use crate::gpio::HardwareConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "iambic-keyerd")]
#[command(version, about = "Iambic Morse keyer for paddles on Linux GPIO")]
#[command(long_about = "
Reads a dual-lever paddle from two GPIO lines and keys a third line
with dot/dash timing, plus a square-wave sidetone on a fourth.

MODES:
  0  straight key on the dash paddle, automatic dots on the dot paddle (bug)
  1  iambic A
  2  iambic B
")]
pub struct Cli {
    /// Automatic letter spacing (0 = off, 1 = on)
    #[arg(short = 'c', long = "spacing", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub spacing: u8,

    /// Sidetone frequency in Hz
    #[arg(short = 'f', long = "sidetone", default_value_t = 800)]
    pub sidetone_hz: u32,

    /// Keyer mode (0 = straight/bug, 1 = iambic A, 2 = iambic B)
    #[arg(short = 'm', long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub mode: u8,

    /// Speed in words per minute (1-60)
    #[arg(short = 's', long = "speed", default_value_t = 20)]
    pub wpm: u32,

    /// Dash weight in percent (50 = 3:1)
    #[arg(short = 'w', long, default_value_t = 50)]
    pub weight: u32,

    /// Swap the dot and dash paddles
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// GPIO character device
    #[arg(long, value_name = "PATH", default_value = "/dev/gpiochip0")]
    pub chip: PathBuf,

    /// Line offset of the left paddle
    #[arg(long, default_value_t = 13)]
    pub left_line: u32,

    /// Line offset of the right paddle
    #[arg(long, default_value_t = 15)]
    pub right_line: u32,

    /// Line offset of the key output
    #[arg(long, default_value_t = 12)]
    pub key_line: u32,

    /// Line offset of the sidetone output
    #[arg(long, default_value_t = 11)]
    pub tone_line: u32,

    /// Disable the sidetone output
    #[arg(long)]
    pub no_sidetone: bool,

    /// Paddle contact steady time in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 25)]
    pub debounce_ms: u32,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Validated keyer configuration
    pub fn keyer_config(&self) -> Result<KeyerConfig, ConfigError> {
        KeyerConfig::new(
            self.wpm,
            self.weight,
            KeyerMode::try_from(self.mode)?,
            self.spacing != 0,
            self.reverse,
            self.sidetone_hz,
        )
    }

    /// GPIO lines to claim
    pub fn hardware(&self) -> HardwareConfig {
        HardwareConfig {
            chip: self.chip.clone(),
            left_line: self.left_line,
            right_line: self.right_line,
            key_line: self.key_line,
            tone_line: (!self.no_sidetone).then_some(self.tone_line),
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

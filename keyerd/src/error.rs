use std::path::PathBuf;

use keyer_core::{HalError, PaddleSide};
use linux_embedded_hal::gpio_cdev;
use thiserror::Error;

/// Hardware failures of the daemon
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Cannot open GPIO chip {}: {source}", path.display())]
    Chip {
        path: PathBuf,
        source: gpio_cdev::errors::Error,
    },

    #[error("Cannot claim GPIO line {offset} ({label}): {source}")]
    Line {
        offset: u32,
        label: &'static str,
        source: gpio_cdev::errors::Error,
    },

    #[error("Paddle read failed on the {side:?} side: {source}")]
    Paddle { side: PaddleSide, source: HalError },
}

pub type Result<T> = std::result::Result<T, DaemonError>;

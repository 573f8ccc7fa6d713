//! GPIO character device lines

use std::path::PathBuf;

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::CdevPin;
use tracing::debug;

use crate::error::{DaemonError, Result};

/// Consumer label shown by `gpioinfo`
const CONSUMER: &str = "iambic-keyerd";

/// Line offsets on one GPIO chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareConfig {
    pub chip: PathBuf,
    pub left_line: u32,
    pub right_line: u32,
    pub key_line: u32,
    /// None when the sidetone is disabled
    pub tone_line: Option<u32>,
}

/// Claimed lines. Paddles are inputs, key and tone start low.
pub struct GpioLines {
    pub left: CdevPin,
    pub right: CdevPin,
    pub key: CdevPin,
    pub tone: Option<CdevPin>,
}

impl GpioLines {
    pub fn open(config: &HardwareConfig) -> Result<Self> {
        let mut chip = Chip::new(&config.chip).map_err(|source| DaemonError::Chip {
            path: config.chip.clone(),
            source,
        })?;
        debug!("Opened {}", config.chip.display());

        let left = request(&mut chip, config.left_line, LineRequestFlags::INPUT, "left paddle")?;
        let right = request(&mut chip, config.right_line, LineRequestFlags::INPUT, "right paddle")?;
        let key = request(&mut chip, config.key_line, LineRequestFlags::OUTPUT, "key")?;
        let tone = config
            .tone_line
            .map(|offset| request(&mut chip, offset, LineRequestFlags::OUTPUT, "sidetone"))
            .transpose()?;

        Ok(Self { left, right, key, tone })
    }
}

fn request(
    chip: &mut Chip,
    offset: u32,
    flags: LineRequestFlags,
    label: &'static str,
) -> Result<CdevPin> {
    let line_error = |source| DaemonError::Line { offset, label, source };

    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(flags, 0, CONSUMER))
        .map_err(line_error)?;
    let pin = CdevPin::new(handle).map_err(line_error)?;
    debug!(offset, label, "Claimed line");
    Ok(pin)
}

//! Iambic keyer daemon for Linux hosts.
//!
//! Paddles and key line live on a GPIO character device; the engine from
//! `keyer-core` runs on a tokio current-thread runtime with an embassy-time
//! ticker, fed by a debouncing poller thread.

pub mod cli;
pub mod error;
pub mod gpio;
pub mod poller;
pub mod sidetone;
pub mod worker;

pub use cli::Cli;
pub use error::{DaemonError, Result};
pub use gpio::{GpioLines, HardwareConfig};
pub use poller::PaddlePoller;
pub use sidetone::SoftTone;
pub use worker::{run_keyer, PADDLES, WAKE};

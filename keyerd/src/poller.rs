//! Paddle input source: samples both contacts every millisecond,
//! debounces them and publishes changes to the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::RawMutex;
use keyer_core::{
    Debouncer, HalError, InputPaddle, KeyerMode, PaddleInput, PaddleSide, WakeSignal, TICK_MS,
};
use tracing::{debug, trace};

use crate::error::{DaemonError, Result};

/// Sampling period of the contacts
pub const POLL_INTERVAL: Duration = Duration::from_millis(TICK_MS);

pub struct PaddlePoller<L, R> {
    left: L,
    right: R,
    left_filter: Debouncer,
    right_filter: Debouncer,
    mode: KeyerMode,
}

impl<L, R> PaddlePoller<L, R>
where
    L: InputPaddle<Error = HalError>,
    R: InputPaddle<Error = HalError>,
{
    /// `debounce_ms` is the time a contact level must hold before it counts
    pub fn new(left: L, right: R, mode: KeyerMode, debounce_ms: u32) -> Self {
        let steady = (debounce_ms / TICK_MS as u32).max(1);
        Self {
            left,
            right,
            left_filter: Debouncer::new(steady),
            right_filter: Debouncer::new(steady),
            mode,
        }
    }

    /// Sample both contacts once. Returns true if the engine must be woken.
    pub fn poll_once(&mut self, paddles: &PaddleInput) -> Result<bool> {
        let left = read(&mut self.left, PaddleSide::Left)?;
        let right = read(&mut self.right, PaddleSide::Right)?;

        let mut wake = false;
        if let Some(level) = self.left_filter.sample(left) {
            trace!(pressed = level, "left paddle");
            wake |= paddles.update(PaddleSide::Left, level, self.mode);
        }
        if let Some(level) = self.right_filter.sample(right) {
            trace!(pressed = level, "right paddle");
            wake |= paddles.update(PaddleSide::Right, level, self.mode);
        }
        Ok(wake)
    }

    /// Blocking poll loop. Runs until `stop` is set or a read fails.
    pub fn run<M>(mut self, paddles: &PaddleInput, wake: &WakeSignal<M>, stop: &AtomicBool) -> Result<()>
    where
        M: RawMutex,
    {
        debug!("Paddle poller started");
        while !stop.load(Ordering::Acquire) {
            if self.poll_once(paddles)? {
                wake.signal(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }
}

fn read<P: InputPaddle<Error = HalError>>(paddle: &mut P, side: PaddleSide) -> Result<bool> {
    paddle
        .is_pressed()
        .map_err(|source| DaemonError::Paddle { side, source })
}

//! Square-wave sidetone toggled from a dedicated thread

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use keyer_core::{HalError, Sidetone};
use tracing::{trace, warn};

const IDLE_WAIT: Duration = Duration::from_millis(50);

struct ToneState {
    /// 0 while silent
    hz: AtomicU32,
    running: AtomicBool,
}

/// Software tone generator on an output line
pub struct SoftTone {
    state: Arc<ToneState>,
    worker: Option<JoinHandle<()>>,
}

impl SoftTone {
    /// Start the tone thread on `pin`
    pub fn spawn<P>(pin: P) -> io::Result<Self>
    where
        P: OutputPin + Send + 'static,
    {
        let state = Arc::new(ToneState {
            hz: AtomicU32::new(0),
            running: AtomicBool::new(true),
        });
        let shared = Arc::clone(&state);
        let worker = thread::Builder::new()
            .name("sidetone".into())
            .spawn(move || tone_loop(pin, &shared))?;

        Ok(Self { state, worker: Some(worker) })
    }

    /// Tone that tracks start/stop but drives nothing
    pub fn disabled() -> Self {
        Self {
            state: Arc::new(ToneState {
                hz: AtomicU32::new(0),
                running: AtomicBool::new(false),
            }),
            worker: None,
        }
    }

    pub fn frequency(&self) -> Option<u32> {
        match self.state.hz.load(Ordering::Acquire) {
            0 => None,
            hz => Some(hz),
        }
    }
}

impl Sidetone for SoftTone {
    type Error = HalError;

    fn start(&mut self, hz: u32) -> Result<(), Self::Error> {
        if hz == 0 {
            return Err(HalError::ToneError);
        }
        self.state.hz.store(hz, Ordering::Release);
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.state.hz.store(0, Ordering::Release);
        Ok(())
    }
}

impl Drop for SoftTone {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            worker.thread().unpark();
            let _ = worker.join();
        }
    }
}

/// Half of one period of `hz`
pub fn half_period(hz: u32) -> Duration {
    Duration::from_micros(500_000 / u64::from(hz.max(1)))
}

fn tone_loop<P: OutputPin>(mut pin: P, state: &ToneState) {
    let mut high = false;

    while state.running.load(Ordering::Acquire) {
        let hz = state.hz.load(Ordering::Acquire);
        if hz == 0 {
            if high {
                high = false;
                if let Err(err) = pin.set_low() {
                    warn!("Sidetone line write failed: {:?}", err);
                    break;
                }
            }
            thread::park_timeout(IDLE_WAIT);
            continue;
        }

        high = !high;
        let written = if high { pin.set_high() } else { pin.set_low() };
        if let Err(err) = written {
            warn!("Sidetone line write failed: {:?}", err);
            break;
        }
        thread::sleep(half_period(hz));
    }

    let _ = pin.set_low();
    trace!("Sidetone thread exiting");
}

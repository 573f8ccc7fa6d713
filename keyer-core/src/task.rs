//! Async runner: waits for a wake, then ticks one episode to completion

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use crate::controller::PaddleInput;
use crate::fsm::{EpisodeReport, Keyer};
use crate::hal::OutputKey;

/// Wake notification from the paddle input source to the engine.
/// Repeated signals before the engine waits coalesce into one.
pub type WakeSignal<M> = Signal<M, ()>;

/// Source of the 1 ms evaluation period
#[allow(async_fn_in_trait)]
pub trait TickSource {
    /// Realign the period to now; called as an episode starts
    fn restart(&mut self) {}

    /// Resolve at the next tick boundary
    async fn next_tick(&mut self);
}

/// Tick source backed by an embassy-time ticker
#[cfg(feature = "embassy-time")]
pub struct EmbassyTicker {
    ticker: embassy_time::Ticker,
}

#[cfg(feature = "embassy-time")]
impl EmbassyTicker {
    pub fn new() -> Self {
        Self { ticker: Self::period() }
    }

    fn period() -> embassy_time::Ticker {
        embassy_time::Ticker::every(embassy_time::Duration::from_millis(crate::timing::TICK_MS))
    }
}

#[cfg(feature = "embassy-time")]
impl Default for EmbassyTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "embassy-time")]
impl TickSource for EmbassyTicker {
    fn restart(&mut self) {
        // A ticker left idle between episodes would fire its missed periods back to back
        self.ticker = Self::period();
    }

    async fn next_tick(&mut self) {
        self.ticker.next().await;
    }
}

impl Keyer {
    /// Run one episode from Check to Done.
    ///
    /// The first tick is evaluated immediately; paddles are re-sampled
    /// on every tick.
    pub async fn run_episode<O, T>(
        &self,
        paddles: &PaddleInput,
        key: &mut O,
        ticks: &mut T,
    ) -> Result<EpisodeReport, O::Error>
    where
        O: OutputKey,
        T: TickSource,
    {
        let mut episode = self.episode();
        ticks.restart();
        loop {
            let state = paddles.state(self.timing().mapping);
            if let Some(level) = episode.tick(self, state) {
                key.set_state(level)?;
            }
            if episode.is_done() {
                return Ok(episode.report());
            }
            ticks.next_tick().await;
        }
    }

    /// Worker loop: block on `wake`, run an episode, repeat.
    ///
    /// Only returns on an output error. Dropping the future cancels at
    /// the next tick boundary.
    pub async fn run<M, O, T, F>(
        &self,
        paddles: &PaddleInput,
        wake: &WakeSignal<M>,
        key: &mut O,
        ticks: &mut T,
        mut on_episode: F,
    ) -> Result<core::convert::Infallible, O::Error>
    where
        M: RawMutex,
        O: OutputKey,
        T: TickSource,
        F: FnMut(&EpisodeReport),
    {
        loop {
            wake.wait().await;
            let report = self.run_episode(paddles, key, ticks).await?;
            #[cfg(feature = "defmt")]
            defmt::debug!("episode: {} elements, {} ticks", report.elements_sent, report.ticks);
            on_episode(&report);
        }
    }
}

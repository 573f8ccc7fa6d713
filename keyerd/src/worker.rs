//! Keyer engine task and the statics it shares with the paddle poller

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use keyer_core::{EmbassyTicker, EpisodeReport, Keyer, OutputKey, PaddleInput, WakeSignal};
use tracing::debug;

/// Debounced paddle levels, written by the poller thread
pub static PADDLES: PaddleInput = PaddleInput::new();

/// Raised by the poller when the engine has work to do
pub static WAKE: WakeSignal<CriticalSectionRawMutex> = Signal::new();

/// Run the engine forever on a 1 ms ticker.
/// Returns only when the key output fails.
pub async fn run_keyer<O: OutputKey>(keyer: Keyer, key: &mut O) -> Result<Infallible, O::Error> {
    let mut ticker = EmbassyTicker::new();
    keyer.run(&PADDLES, &WAKE, key, &mut ticker, log_episode).await
}

/// Recent elements of an episode as dots and dashes
pub fn render_elements(report: &EpisodeReport) -> String {
    report.recent().map(|element| element.symbol()).collect()
}

fn log_episode(report: &EpisodeReport) {
    debug!(
        ticks = report.ticks,
        elements = report.elements_sent,
        key_down = report.key_down,
        "Sent {}",
        render_elements(report)
    );
}

//! Async runner against a paused tokio clock

use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use keyer_core::mock::{MockKeyOutput, MockSidetone};
use keyer_core::{
    EpisodeReport, KeyLine, KeyerMode, PaddleInput, PaddleSide, TickSource, WakeSignal,
};
use tokio::time::{interval, sleep, Instant, Interval, MissedTickBehavior};
use tokio_test::{assert_pending, assert_ready};

use crate::common::keyer;

/// 1 ms tick source on the tokio clock
struct TokioTicks {
    interval: Interval,
}

impl TokioTicks {
    fn new() -> Self {
        let mut interval = interval(Duration::from_millis(1));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl TickSource for TokioTicks {
    fn restart(&mut self) {
        self.interval.reset();
    }

    async fn next_tick(&mut self) {
        self.interval.tick().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_run_episode_single_dot() {
    let keyer = keyer(KeyerMode::IambicA);
    let paddles = PaddleInput::new();
    let mut key = MockKeyOutput::new();
    let mut ticks = TokioTicks::new();

    paddles.update(PaddleSide::Left, true, KeyerMode::IambicA);
    let start = Instant::now();

    let release = async {
        sleep(Duration::from_millis(5)).await;
        paddles.update(PaddleSide::Left, false, KeyerMode::IambicA);
    };
    let (report, ()) = tokio::join!(keyer.run_episode(&paddles, &mut key, &mut ticks), release);
    let report = report.unwrap();

    // 20 ms dot, 20 ms gap, finished on the 41st evaluation
    assert_eq!(start.elapsed(), Duration::from_millis(40));
    assert_eq!(report.ticks, 41);
    assert_eq!(report.elements_sent, 1);
    assert!(!report.key_down);
    assert_eq!(key.writes(), [true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_run_episode_without_paddles_ends_at_once() {
    let keyer = keyer(KeyerMode::IambicB);
    let paddles = PaddleInput::new();
    let mut key = MockKeyOutput::new();
    let mut ticks = TokioTicks::new();

    let start = Instant::now();
    let report = keyer.run_episode(&paddles, &mut key, &mut ticks).await.unwrap();

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(report.ticks, 1);
    assert_eq!(report.elements_sent, 0);
    assert_eq!(key.writes(), [false]);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_waits_for_wake() {
    let keyer = keyer(KeyerMode::IambicB);
    let paddles = PaddleInput::new();
    let wake: WakeSignal<CriticalSectionRawMutex> = WakeSignal::new();
    let mut line = KeyLine::new(MockKeyOutput::new(), MockSidetone::new(), 600);
    let mut ticks = TokioTicks::new();
    let mut reports: Vec<EpisodeReport> = Vec::new();

    let operator = async {
        sleep(Duration::from_millis(100)).await;
        if paddles.update(PaddleSide::Right, true, KeyerMode::IambicB) {
            wake.signal(());
        }
        sleep(Duration::from_millis(10)).await;
        paddles.update(PaddleSide::Right, false, KeyerMode::IambicB);
    };
    let runner = tokio::time::timeout(
        Duration::from_millis(500),
        keyer.run(&paddles, &wake, &mut line, &mut ticks, |report| {
            reports.push(report.clone())
        }),
    );
    let (outcome, ()) = tokio::join!(runner, operator);

    assert!(outcome.is_err(), "runner returned early");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].elements_sent, 1);
    assert_eq!(reports[0].recent().collect::<Vec<_>>(), [keyer_core::Element::Dash]);
    assert_eq!(line.key().writes(), [true, false]);
    assert_eq!(line.tone().starts(), 1);
    assert_eq!(line.tone().sounding(), None);
}

#[test]
fn test_wake_signals_coalesce() {
    let wake: WakeSignal<CriticalSectionRawMutex> = WakeSignal::new();

    let mut waiter = tokio_test::task::spawn(wake.wait());
    assert_pending!(waiter.poll());

    wake.signal(());
    wake.signal(());
    assert!(waiter.is_woken());
    assert_ready!(waiter.poll());

    // Both signals were consumed by the one wait
    let mut second = tokio_test::task::spawn(wake.wait());
    assert_pending!(second.poll());
}

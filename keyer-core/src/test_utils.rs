//! Test utilities: scripted paddles, a tick-accurate simulator and
//! key timeline analysis

use std::string::String;
use std::vec::Vec;

use crate::controller::PaddleInput;
use crate::fsm::{Episode, EpisodeReport, Keyer};
use crate::timing::KeyerTiming;
use crate::types::PaddleSide;

/// One scripted paddle change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddleEvent {
    pub tick: u32,
    pub side: PaddleSide,
    pub pressed: bool,
}

/// Paddle activity on physical sides, by tick
#[derive(Debug, Clone, Default)]
pub struct PaddleScript {
    events: Vec<PaddleEvent>,
}

impl PaddleScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(mut self, tick: u32, side: PaddleSide) -> Self {
        self.events.push(PaddleEvent { tick, side, pressed: true });
        self
    }

    pub fn release(mut self, tick: u32, side: PaddleSide) -> Self {
        self.events.push(PaddleEvent { tick, side, pressed: false });
        self
    }

    /// Press at `from`, release at `to`
    pub fn hold(self, side: PaddleSide, from: u32, to: u32) -> Self {
        self.press(from, side).release(to, side)
    }

    /// Both paddles over the same interval
    pub fn squeeze(self, from: u32, to: u32) -> Self {
        self.hold(PaddleSide::Left, from, to).hold(PaddleSide::Right, from, to)
    }

    pub fn events(&self) -> &[PaddleEvent] {
        &self.events
    }

    fn at(&self, tick: u32) -> impl Iterator<Item = &PaddleEvent> + '_ {
        self.events.iter().filter(move |event| event.tick == tick)
    }
}

/// Whole-system simulation at 1 ms resolution.
///
/// Mirrors the runtime: paddle changes issue wakes, wakes coalesce while
/// an episode runs, and a pending wake starts the next episode in the same
/// tick the previous one ended.
pub struct Simulator {
    keyer: Keyer,
    paddles: PaddleInput,
    wake_pending: bool,
    episode: Option<Episode>,
    key_down: bool,
    reports: Vec<EpisodeReport>,
}

impl Simulator {
    pub fn new(keyer: Keyer) -> Self {
        Self {
            keyer,
            paddles: PaddleInput::new(),
            wake_pending: false,
            episode: None,
            key_down: false,
            reports: Vec::new(),
        }
    }

    /// Run `script` for `ticks` periods and capture the key line
    pub fn run(mut self, script: &PaddleScript, ticks: u32) -> SimulationResult {
        let mut levels = Vec::with_capacity(ticks as usize);
        for tick in 0..ticks {
            for event in script.at(tick) {
                if self.paddles.update(event.side, event.pressed, self.keyer.config().mode) {
                    self.wake_pending = true;
                }
            }
            self.step();
            levels.push(self.key_down);
        }
        SimulationResult {
            timeline: KeyTimeline { levels },
            reports: self.reports,
        }
    }

    fn step(&mut self) {
        loop {
            if self.episode.is_none() {
                if !self.wake_pending {
                    return;
                }
                self.wake_pending = false;
                self.episode = Some(self.keyer.episode());
            }
            let state = self.paddles.state(self.keyer.timing().mapping);
            let Some(episode) = self.episode.as_mut() else {
                return;
            };
            if let Some(level) = episode.tick(&self.keyer, state) {
                self.key_down = level;
            }
            if !episode.is_done() {
                return;
            }
            self.reports.push(episode.report());
            self.episode = None;
        }
    }
}

/// Output of a simulation run
pub struct SimulationResult {
    pub timeline: KeyTimeline,
    pub reports: Vec<EpisodeReport>,
}

/// Convenience: simulate `script` against a fresh keyer
pub fn simulate(keyer: Keyer, script: &PaddleScript, ticks: u32) -> SimulationResult {
    Simulator::new(keyer).run(script, ticks)
}

/// A key-down run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub start: u32,
    pub len: u32,
}

impl Pulse {
    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

/// Key level for every tick of a run
#[derive(Debug, Clone)]
pub struct KeyTimeline {
    levels: Vec<bool>,
}

impl KeyTimeline {
    pub fn level_at(&self, tick: u32) -> bool {
        self.levels.get(tick as usize).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Completed key-down runs; one still running at the end is dropped
    pub fn pulses(&self) -> Vec<Pulse> {
        let mut pulses = Vec::new();
        let mut start = None;
        for (tick, &level) in self.levels.iter().enumerate() {
            match (level, start) {
                (true, None) => start = Some(tick as u32),
                (false, Some(s)) => {
                    pulses.push(Pulse { start: s, len: tick as u32 - s });
                    start = None;
                }
                _ => {}
            }
        }
        pulses
    }

    /// Silence between consecutive pulses
    pub fn gaps(&self) -> Vec<u32> {
        self.pulses()
            .windows(2)
            .map(|pair| pair[1].start - pair[0].end())
            .collect()
    }

    /// Render pulses as `.`/`-`; anything of the wrong length shows as `?`
    pub fn to_morse_string(&self, timing: &KeyerTiming) -> String {
        self.pulses()
            .iter()
            .map(|pulse| {
                if pulse.len == timing.dot {
                    '.'
                } else if pulse.len == timing.dash {
                    '-'
                } else {
                    '?'
                }
            })
            .collect()
    }
}

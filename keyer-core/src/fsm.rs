//! Finite state machine implementation for the keyer timing engine

use heapless::HistoryBuffer;
use crate::controller::PaddleState;
use crate::timing::KeyerTiming;
use crate::types::{Element, KeyerConfig, KeyerMode};

/// Decision steps allowed inside one tick before the episode is forced to end.
/// Valid timings never need more than four.
pub const MAX_STEPS_PER_TICK: usize = 8;

/// Elements kept in an episode report
pub const REPORT_HISTORY: usize = 16;

/// Engine states for one keying episode
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Entry point: decide what the paddles ask for
    Check,
    /// Drop stale memory before a dot
    PreDot,
    /// Drop stale memory before a dash
    PreDash,
    /// Key down for one dot
    SendDot,
    /// Key down for one dash
    SendDash,
    /// Key up for one dot after a dot
    DotGap,
    /// Key up for one dot after a dash
    DashGap,
    /// Dot finished, look at the paddles again
    DotHeld,
    /// Dash finished, look at the paddles again
    DashHeld,
    /// Two more dots of silence between characters
    LetterSpace,
    /// Episode finished
    Done,
}

impl EngineState {
    /// Timed states consume a tick per evaluation, the rest are instantaneous
    pub const fn is_timed(&self) -> bool {
        matches!(
            self,
            EngineState::SendDot
                | EngineState::SendDash
                | EngineState::DotGap
                | EngineState::DashGap
                | EngineState::LetterSpace
        )
    }
}

/// Dot/dash memory flags
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Memory {
    pub dot: bool,
    pub dash: bool,
}

impl Memory {
    pub const EMPTY: Memory = Memory { dot: false, dash: false };
}

/// Result of evaluating one state
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub state: EngineState,
    pub memory: Memory,
    pub elapsed: u32,
    /// Key level decided by this step, if any
    pub output: Option<bool>,
    /// The step used up the current tick
    pub consumed: bool,
}

impl Transition {
    /// Stay in a timed state for this tick
    const fn hold(state: EngineState, memory: Memory, elapsed: u32, output: Option<bool>) -> Self {
        Self { state, memory, elapsed, output, consumed: true }
    }

    /// Move on without using the tick
    const fn goto(state: EngineState, memory: Memory, output: Option<bool>) -> Self {
        Self { state, memory, elapsed: 0, output, consumed: false }
    }
}

/// Keyer timing engine.
///
/// Holds the immutable configuration and derived timing. Each wake runs
/// one [`Episode`] from [`EngineState::Check`] to [`EngineState::Done`].
#[derive(Copy, Clone, Debug)]
pub struct Keyer {
    config: KeyerConfig,
    timing: KeyerTiming,
}

impl Keyer {
    /// Create an engine; the configuration is assumed validated
    pub const fn new(config: KeyerConfig) -> Self {
        Self {
            config,
            timing: KeyerTiming::from_config(&config),
        }
    }

    pub fn config(&self) -> &KeyerConfig {
        &self.config
    }

    pub fn timing(&self) -> &KeyerTiming {
        &self.timing
    }

    /// Fresh episode state: Check, empty memory
    pub fn episode(&self) -> Episode {
        Episode::new()
    }

    /// Evaluate one state. Pure: depends only on its arguments and the
    /// fixed configuration.
    pub fn transition(
        &self,
        state: EngineState,
        memory: Memory,
        paddles: PaddleState,
        elapsed: u32,
    ) -> Transition {
        let mode = self.config.mode;
        let dot = self.timing.dot;
        let mut memory = memory;

        match state {
            EngineState::Check => {
                if mode == KeyerMode::Straight {
                    // Dash paddle is a plain key, dot paddle repeats dots
                    if paddles.dash {
                        Transition::goto(EngineState::Done, memory, Some(true))
                    } else if paddles.dot {
                        Transition::goto(EngineState::PreDot, memory, None)
                    } else {
                        Transition::goto(EngineState::Done, memory, Some(false))
                    }
                } else if paddles.dot {
                    Transition::goto(EngineState::PreDot, memory, None)
                } else if paddles.dash {
                    Transition::goto(EngineState::PreDash, memory, None)
                } else {
                    Transition::goto(EngineState::Done, memory, Some(false))
                }
            }

            EngineState::PreDot => Transition::goto(EngineState::SendDot, Memory::EMPTY, None),
            EngineState::PreDash => Transition::goto(EngineState::SendDash, Memory::EMPTY, None),

            EngineState::SendDot => {
                if elapsed == self.timing.dot {
                    return Transition::goto(EngineState::DotGap, memory, Some(false));
                }
                // Only Mode A looks at the paddles while sending
                if mode == KeyerMode::IambicA {
                    if paddles.released() {
                        memory.dash = false;
                    } else if paddles.dash {
                        memory.dash = true;
                    }
                }
                Transition::hold(EngineState::SendDot, memory, elapsed + 1, Some(true))
            }

            EngineState::SendDash => {
                if elapsed == self.timing.dash {
                    return Transition::goto(EngineState::DashGap, memory, Some(false));
                }
                if mode == KeyerMode::IambicA {
                    if paddles.released() {
                        memory.dot = false;
                    } else if paddles.dot {
                        memory.dot = true;
                    }
                }
                Transition::hold(EngineState::SendDash, memory, elapsed + 1, Some(true))
            }

            EngineState::DotGap => {
                if elapsed == dot {
                    let next = if !paddles.dot && mode == KeyerMode::Straight {
                        // bug released: stop repeating
                        EngineState::Done
                    } else if memory.dash {
                        EngineState::PreDash
                    } else {
                        EngineState::DotHeld
                    };
                    return Transition::goto(next, memory, None);
                }
                if paddles.dash {
                    memory.dash = true;
                }
                Transition::hold(EngineState::DotGap, memory, elapsed + 1, Some(false))
            }

            EngineState::DashGap => {
                if elapsed == dot {
                    let next = if memory.dot {
                        EngineState::PreDot
                    } else {
                        EngineState::DashHeld
                    };
                    return Transition::goto(next, memory, None);
                }
                if paddles.dot {
                    memory.dot = true;
                }
                Transition::hold(EngineState::DashGap, memory, elapsed + 1, Some(false))
            }

            EngineState::DotHeld => {
                if paddles.dot {
                    Transition::goto(EngineState::PreDot, memory, None)
                } else if paddles.dash {
                    Transition::goto(EngineState::PreDash, memory, None)
                } else {
                    self.after_character(memory)
                }
            }

            EngineState::DashHeld => {
                if paddles.dash {
                    Transition::goto(EngineState::PreDash, memory, None)
                } else if paddles.dot {
                    Transition::goto(EngineState::PreDot, memory, None)
                } else {
                    self.after_character(memory)
                }
            }

            EngineState::LetterSpace => {
                if elapsed == self.timing.letter_space_extension() {
                    let next = if memory.dot {
                        EngineState::PreDot
                    } else if memory.dash {
                        EngineState::PreDash
                    } else {
                        EngineState::Done
                    };
                    return Transition::goto(next, memory, None);
                }
                if paddles.dot {
                    memory.dot = true;
                }
                if paddles.dash {
                    memory.dash = true;
                }
                Transition::hold(EngineState::LetterSpace, memory, elapsed + 1, Some(false))
            }

            EngineState::Done => Transition::hold(EngineState::Done, memory, 0, None),
        }
    }

    fn after_character(&self, memory: Memory) -> Transition {
        if self.config.letter_space {
            Transition::goto(EngineState::LetterSpace, Memory::EMPTY, None)
        } else {
            Transition::goto(EngineState::Done, memory, None)
        }
    }
}

/// Mutable state of one keying episode
#[derive(Clone)]
pub struct Episode {
    state: EngineState,
    memory: Memory,
    elapsed: u32,
    level: Option<bool>,
    ticks: u32,
    elements_sent: u32,
    recent: HistoryBuffer<Element, REPORT_HISTORY>,
}

impl Episode {
    fn new() -> Self {
        Self {
            state: EngineState::Check,
            memory: Memory::EMPTY,
            elapsed: 0,
            level: None,
            ticks: 0,
            elements_sent: 0,
            recent: HistoryBuffer::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn memory(&self) -> Memory {
        self.memory
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_done(&self) -> bool {
        self.state == EngineState::Done
    }

    /// Run one evaluation period.
    ///
    /// Instantaneous states are chained until a timed state has used the
    /// tick or the episode ends. Returns the new key level if it changed.
    pub fn tick(&mut self, keyer: &Keyer, paddles: PaddleState) -> Option<bool> {
        if self.is_done() {
            return None;
        }
        self.ticks += 1;
        let before = self.level;

        let mut consumed = false;
        for _ in 0..MAX_STEPS_PER_TICK {
            let previous = self.state;
            let step = keyer.transition(self.state, self.memory, paddles, self.elapsed);
            self.state = step.state;
            self.memory = step.memory;
            self.elapsed = step.elapsed;
            if let Some(level) = step.output {
                self.level = Some(level);
            }
            match (previous, step.state) {
                (EngineState::PreDot, EngineState::SendDot) => self.record(Element::Dot),
                (EngineState::PreDash, EngineState::SendDash) => self.record(Element::Dash),
                _ => {}
            }
            if step.consumed || self.is_done() {
                consumed = true;
                break;
            }
        }
        if !consumed {
            self.state = EngineState::Done;
        }

        #[cfg(feature = "defmt")]
        {
            if self.is_done() {
                defmt::trace!("episode done after {} ticks", self.ticks);
            }
        }

        if self.level != before {
            self.level
        } else {
            None
        }
    }

    fn record(&mut self, element: Element) {
        self.elements_sent += 1;
        self.recent.write(element);
    }

    /// Summary of the episode so far
    pub fn report(&self) -> EpisodeReport {
        EpisodeReport {
            ticks: self.ticks,
            elements_sent: self.elements_sent,
            key_down: self.level.unwrap_or(false),
            recent: self.recent.clone(),
        }
    }
}

/// What an episode did, for logging and tests
#[derive(Clone)]
pub struct EpisodeReport {
    /// Evaluation periods consumed
    pub ticks: u32,
    /// Dots and dashes started
    pub elements_sent: u32,
    /// Key level left on the line
    pub key_down: bool,
    recent: HistoryBuffer<Element, REPORT_HISTORY>,
}

impl EpisodeReport {
    /// Most recent elements, oldest first
    pub fn recent(&self) -> impl Iterator<Item = Element> + '_ {
        self.recent.oldest_ordered().copied()
    }
}

impl core::fmt::Debug for EpisodeReport {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EpisodeReport")
            .field("ticks", &self.ticks)
            .field("elements_sent", &self.elements_sent)
            .field("key_down", &self.key_down)
            .field("recent", &self.recent.as_slice())
            .finish()
    }
}

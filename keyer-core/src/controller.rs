//! Paddle input state shared between the input source and the engine

use portable_atomic::{AtomicU8, Ordering};
use crate::timing::PaddleMapping;
use crate::types::{KeyerMode, PaddleSide};

const LEFT_BIT: u8 = 0b01;
const RIGHT_BIT: u8 = 0b10;

const fn side_bit(side: PaddleSide) -> u8 {
    match side {
        PaddleSide::Left => LEFT_BIT,
        PaddleSide::Right => RIGHT_BIT,
    }
}

/// Physical paddle levels captured at one instant
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaddleSnapshot {
    pub left: bool,
    pub right: bool,
}

impl PaddleSnapshot {
    const fn from_bits(bits: u8) -> Self {
        Self {
            left: bits & LEFT_BIT != 0,
            right: bits & RIGHT_BIT != 0,
        }
    }

    /// Level of one physical side
    pub const fn side(&self, side: PaddleSide) -> bool {
        match side {
            PaddleSide::Left => self.left,
            PaddleSide::Right => self.right,
        }
    }

    /// Map physical sides onto dot/dash roles
    pub const fn resolve(&self, mapping: PaddleMapping) -> PaddleState {
        PaddleState {
            dot: self.side(mapping.dot),
            dash: self.side(mapping.dash),
        }
    }
}

/// Logical paddle roles as seen by the engine
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PaddleState {
    pub dot: bool,
    pub dash: bool,
}

impl PaddleState {
    pub const RELEASED: PaddleState = PaddleState { dot: false, dash: false };
    pub const DOT: PaddleState = PaddleState { dot: true, dash: false };
    pub const DASH: PaddleState = PaddleState { dot: false, dash: true };
    pub const SQUEEZE: PaddleState = PaddleState { dot: true, dash: true };

    /// Neither paddle closed
    pub const fn released(&self) -> bool {
        !self.dot && !self.dash
    }
}

/// Atomic paddle state.
///
/// Both sides live in one packed byte, so readers never observe a
/// half-updated pair. Single writer (input source), single reader (engine).
pub struct PaddleInput {
    bits: AtomicU8,
}

impl PaddleInput {
    /// Create new paddle input with both paddles released
    pub const fn new() -> Self {
        Self { bits: AtomicU8::new(0) }
    }

    /// Record a debounced paddle level.
    ///
    /// Returns true when the engine must be woken: the paddle changed and
    /// either became active or `mode` follows every transition.
    /// Safe to call from an interrupt or another thread.
    pub fn update(&self, side: PaddleSide, pressed: bool, mode: KeyerMode) -> bool {
        let bit = side_bit(side);
        let previous = if pressed {
            self.bits.fetch_or(bit, Ordering::AcqRel)
        } else {
            self.bits.fetch_and(!bit, Ordering::AcqRel)
        };
        let changed = (previous & bit != 0) != pressed;
        changed && (pressed || mode.wakes_on_release())
    }

    /// Consistent view of both paddles
    pub fn snapshot(&self) -> PaddleSnapshot {
        PaddleSnapshot::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Snapshot resolved to dot/dash roles
    pub fn state(&self, mapping: PaddleMapping) -> PaddleState {
        self.snapshot().resolve(mapping)
    }

    /// Release both paddles
    pub fn reset(&self) {
        self.bits.store(0, Ordering::Release);
    }
}

impl Default for PaddleInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Steady-time contact filter.
///
/// A raw level must hold for `steady_ticks` consecutive samples before it
/// is reported, so contact bounce and short glitches never reach the
/// engine.
#[derive(Debug, Clone)]
pub struct Debouncer {
    stable: bool,
    candidate: bool,
    count: u32,
    steady_ticks: u32,
}

impl Debouncer {
    pub const fn new(steady_ticks: u32) -> Self {
        Self {
            stable: false,
            candidate: false,
            count: 0,
            steady_ticks,
        }
    }

    /// Feed one raw sample; returns the new stable level when it changes
    pub fn sample(&mut self, raw: bool) -> Option<bool> {
        if raw == self.stable {
            self.candidate = raw;
            self.count = 0;
            return None;
        }
        if raw != self.candidate {
            self.candidate = raw;
            self.count = 0;
        }
        self.count += 1;
        if self.count >= self.steady_ticks {
            self.stable = raw;
            self.count = 0;
            Some(raw)
        } else {
            None
        }
    }

    /// Last reported level
    pub const fn level(&self) -> bool {
        self.stable
    }
}

//! Hardware abstraction layer: the engine's boundary to pins and tone

use embedded_hal::digital::{InputPin, OutputPin};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Tone generator failed
    ToneError,
}

impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::ToneError => write!(f, "Sidetone operation failed"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for HalError {}

/// Trait for paddle input handling
pub trait InputPaddle {
    type Error: From<HalError>;

    /// Raw (undebounced) contact state
    fn is_pressed(&mut self) -> Result<bool, Self::Error>;
}

/// Trait for key output control
pub trait OutputKey {
    type Error: From<HalError>;

    /// Set key output state (true = key down, false = key up)
    fn set_state(&mut self, state: bool) -> Result<(), Self::Error>;

    /// Get current key output state
    fn get_state(&self) -> Result<bool, Self::Error>;
}

/// Audible monitor tone
pub trait Sidetone {
    type Error: From<HalError>;

    /// Start sounding at `hz`
    fn start(&mut self, hz: u32) -> Result<(), Self::Error>;

    /// Silence
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Paddle on an embedded-hal input pin.
/// Active low: pulled up, grounded when the contact closes.
pub struct EmbeddedHalPaddle<P> {
    pin: P,
}

impl<P> EmbeddedHalPaddle<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> InputPaddle for EmbeddedHalPaddle<P>
where
    P: InputPin,
{
    type Error = HalError;

    fn is_pressed(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low().map_err(|_| HalError::GpioError)
    }
}

/// Key line on an embedded-hal output pin
pub struct EmbeddedHalKeyOutput<P> {
    pin: P,
    inverted: bool,
    state: bool,
}

impl<P> EmbeddedHalKeyOutput<P>
where
    P: OutputPin,
{
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted, state: false }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> OutputKey for EmbeddedHalKeyOutput<P>
where
    P: OutputPin,
{
    type Error = HalError;

    fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
        let output_state = if self.inverted { !state } else { state };
        if output_state {
            self.pin.set_high().map_err(|_| HalError::GpioError)?;
        } else {
            self.pin.set_low().map_err(|_| HalError::GpioError)?;
        }
        self.state = state;
        Ok(())
    }

    fn get_state(&self) -> Result<bool, Self::Error> {
        // Last commanded level; output pins are not read back
        Ok(self.state)
    }
}

/// Output actuator: key line plus sidetone.
///
/// Only drives the hardware when the level actually changes.
pub struct KeyLine<K, S> {
    key: K,
    tone: S,
    sidetone_hz: u32,
    keyed: Option<bool>,
}

impl<K, S> KeyLine<K, S>
where
    K: OutputKey,
    S: Sidetone,
{
    pub fn new(key: K, tone: S, sidetone_hz: u32) -> Self {
        Self { key, tone, sidetone_hz, keyed: None }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn tone(&self) -> &S {
        &self.tone
    }
}

impl<K, S> OutputKey for KeyLine<K, S>
where
    K: OutputKey,
    S: Sidetone,
    K::Error: From<S::Error>,
{
    type Error = K::Error;

    fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
        if self.keyed == Some(state) {
            return Ok(());
        }
        self.key.set_state(state)?;
        if state {
            self.tone.start(self.sidetone_hz)?;
        } else {
            self.tone.stop()?;
        }
        self.keyed = Some(state);
        Ok(())
    }

    fn get_state(&self) -> Result<bool, Self::Error> {
        self.key.get_state()
    }
}

/// Sidetone that never sounds
pub struct NoSidetone;

impl Sidetone for NoSidetone {
    type Error = HalError;

    fn start(&mut self, _hz: u32) -> Result<(), Self::Error> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use core::cell::Cell;
    use std::vec::Vec;

    #[derive(Default)]
    pub struct MockPaddle {
        pressed: Cell<bool>,
    }

    impl MockPaddle {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_pressed(&self, pressed: bool) {
            self.pressed.set(pressed);
        }
    }

    impl InputPaddle for MockPaddle {
        type Error = HalError;

        fn is_pressed(&mut self) -> Result<bool, Self::Error> {
            Ok(self.pressed.get())
        }
    }

    /// Key output recording every write
    #[derive(Default)]
    pub struct MockKeyOutput {
        state: bool,
        writes: Vec<bool>,
    }

    impl MockKeyOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_active(&self) -> bool {
            self.state
        }

        /// Every level written, in order
        pub fn writes(&self) -> &[bool] {
            &self.writes
        }
    }

    impl OutputKey for MockKeyOutput {
        type Error = HalError;

        fn set_state(&mut self, state: bool) -> Result<(), Self::Error> {
            self.state = state;
            self.writes.push(state);
            Ok(())
        }

        fn get_state(&self) -> Result<bool, Self::Error> {
            Ok(self.state)
        }
    }

    /// Sidetone recording its frequency while sounding
    #[derive(Default)]
    pub struct MockSidetone {
        sounding: Option<u32>,
        starts: usize,
    }

    impl MockSidetone {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sounding(&self) -> Option<u32> {
            self.sounding
        }

        pub fn starts(&self) -> usize {
            self.starts
        }
    }

    impl Sidetone for MockSidetone {
        type Error = HalError;

        fn start(&mut self, hz: u32) -> Result<(), Self::Error> {
            self.sounding = Some(hz);
            self.starts += 1;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Self::Error> {
            self.sounding = None;
            Ok(())
        }
    }
}

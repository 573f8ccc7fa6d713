//! embedded-hal adapters against scripted pin mocks

use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction};
use embedded_hal_mock::eh1::MockError;
use keyer_core::mock::MockSidetone;
use keyer_core::{
    Debouncer, EmbeddedHalKeyOutput, EmbeddedHalPaddle, HalError, InputPaddle, KeyLine,
    KeyerMode, OutputKey, PaddleInput, PaddleMapping, PaddleSide, PaddleState,
};

#[test]
fn test_paddle_reads_active_low() {
    let expectations = [
        Transaction::get(State::High),
        Transaction::get(State::Low),
        Transaction::get(State::High),
    ];
    let mut paddle = EmbeddedHalPaddle::new(PinMock::new(&expectations));

    assert!(!paddle.is_pressed().unwrap());
    assert!(paddle.is_pressed().unwrap());
    assert!(!paddle.is_pressed().unwrap());

    paddle.release().done();
}

#[test]
fn test_key_output_levels() {
    let expectations = [Transaction::set(State::High), Transaction::set(State::Low)];
    let mut key = EmbeddedHalKeyOutput::new(PinMock::new(&expectations), false);

    key.set_state(true).unwrap();
    assert!(key.get_state().unwrap());
    key.set_state(false).unwrap();

    key.release().done();
}

#[test]
fn test_inverted_key_output() {
    let expectations = [Transaction::set(State::Low), Transaction::set(State::High)];
    let mut key = EmbeddedHalKeyOutput::new(PinMock::new(&expectations), true);

    key.set_state(true).unwrap();
    key.set_state(false).unwrap();

    key.release().done();
}

#[test]
fn test_key_line_skips_redundant_writes() {
    let expectations = [Transaction::set(State::High), Transaction::set(State::Low)];
    let mut pin = PinMock::new(&expectations);
    {
        let key = EmbeddedHalKeyOutput::new(pin.clone(), false);
        let mut line = KeyLine::new(key, MockSidetone::new(), 800);

        for level in [true, true, true, false, false] {
            line.set_state(level).unwrap();
        }
        assert_eq!(line.tone().starts(), 1);
    }
    pin.done();
}

#[test]
fn test_pin_failure_maps_to_gpio_error() {
    let expectations =
        [Transaction::get(State::Low).with_error(MockError::Io(std::io::ErrorKind::Other))];
    let mut paddle = EmbeddedHalPaddle::new(PinMock::new(&expectations));

    assert_eq!(paddle.is_pressed(), Err(HalError::GpioError));
    paddle.release().done();
}

#[test]
fn test_bouncing_contact_through_debouncer() {
    // Contact chatter, then a clean closure held for three samples
    let levels = [
        State::Low,
        State::High,
        State::Low,
        State::Low,
        State::Low,
        State::Low,
    ];
    let expectations: Vec<_> = levels.iter().map(|&level| Transaction::get(level)).collect();
    let mut paddle = EmbeddedHalPaddle::new(PinMock::new(&expectations));
    let mut filter = Debouncer::new(3);
    let paddles = PaddleInput::new();
    let mut wakes = 0;

    for _ in levels {
        if let Some(level) = filter.sample(paddle.is_pressed().unwrap()) {
            if paddles.update(PaddleSide::Right, level, KeyerMode::IambicA) {
                wakes += 1;
            }
        }
    }

    assert_eq!(wakes, 1);
    assert_eq!(paddles.state(PaddleMapping::default()), PaddleState::DASH);
    paddle.release().done();
}

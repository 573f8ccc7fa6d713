//! Mode-specific behavior: A/B release handling, straight keying,
//! letter spacing and paddle reversal

use keyer_core::test_utils::{simulate, PaddleScript, Pulse};
use keyer_core::{EngineState, KeyerMode, Memory, PaddleSide, PaddleState};
use rstest::rstest;

use crate::common::{keyer, keyer_with, DASH, DOT};

/// Dot pressed, dash touched during the dot, both released before the gap
fn dash_touched_during_dot() -> PaddleScript {
    PaddleScript::new()
        .hold(PaddleSide::Left, 0, 12)
        .hold(PaddleSide::Right, 5, 12)
}

#[test]
fn test_mode_a_drops_element_on_release() {
    let keyer = keyer(KeyerMode::IambicA);
    let result = simulate(keyer, &dash_touched_during_dot(), 400);

    assert_eq!(result.timeline.pulses(), [Pulse { start: 0, len: DOT }]);
    assert_eq!(result.timeline.to_morse_string(keyer.timing()), ".");
}

#[test]
fn test_mode_b_sends_element_released_in_gap() {
    // Dash closed during the dot and let go only after the gap began
    let script = PaddleScript::new()
        .hold(PaddleSide::Left, 0, 12)
        .hold(PaddleSide::Right, 5, 25);
    let keyer = keyer(KeyerMode::IambicB);
    let result = simulate(keyer, &script, 400);

    assert_eq!(
        result.timeline.pulses(),
        [Pulse { start: 0, len: DOT }, Pulse { start: 40, len: DASH }]
    );
}

#[test]
fn test_mode_b_release_before_gap_sends_nothing_more() {
    let keyer = keyer(KeyerMode::IambicB);
    let result = simulate(keyer, &dash_touched_during_dot(), 400);

    assert_eq!(result.timeline.to_morse_string(keyer.timing()), ".");
}

#[rstest]
#[case::mode_a(KeyerMode::IambicA, ".-.")]
#[case::mode_b(KeyerMode::IambicB, "...")]
fn test_dash_tap_inside_held_dot(#[case] mode: KeyerMode, #[case] expected: &str) {
    // Mode A remembers a tap seen while sending; Mode B only listens in the gaps
    let script = PaddleScript::new()
        .hold(PaddleSide::Left, 0, 100)
        .hold(PaddleSide::Right, 5, 12);
    let keyer = keyer(mode);
    let result = simulate(keyer, &script, 400);

    assert_eq!(result.timeline.to_morse_string(keyer.timing()), expected);
}

#[test]
fn test_only_mode_a_listens_while_sending() {
    let mode_a = keyer(KeyerMode::IambicA);
    let mode_b = keyer(KeyerMode::IambicB);

    let t = mode_a.transition(EngineState::SendDot, Memory::EMPTY, PaddleState::SQUEEZE, 3);
    assert!(t.memory.dash);
    let t = mode_b.transition(EngineState::SendDot, Memory::EMPTY, PaddleState::SQUEEZE, 3);
    assert!(!t.memory.dash);
}

#[rstest]
#[case::mode_a(KeyerMode::IambicA)]
#[case::mode_b(KeyerMode::IambicB)]
fn test_press_during_gap_is_remembered(#[case] mode: KeyerMode) {
    // Dash touched only in the gap after the dot: memory holds in both modes
    let script = PaddleScript::new()
        .hold(PaddleSide::Left, 0, 10)
        .hold(PaddleSide::Right, 25, 30);
    let keyer = keyer(mode);
    let result = simulate(keyer, &script, 400);

    assert_eq!(result.timeline.to_morse_string(keyer.timing()), ".-");
}

#[test]
fn test_straight_follows_dash_paddle() {
    let script = PaddleScript::new()
        .hold(PaddleSide::Right, 10, 47)
        .hold(PaddleSide::Right, 100, 103);
    let result = simulate(keyer(KeyerMode::Straight), &script, 300);

    assert_eq!(
        result.timeline.pulses(),
        [Pulse { start: 10, len: 37 }, Pulse { start: 100, len: 3 }]
    );
}

#[test]
fn test_straight_dot_paddle_is_automatic() {
    let script = PaddleScript::new().hold(PaddleSide::Left, 0, 70);
    let keyer = keyer(KeyerMode::Straight);
    let result = simulate(keyer, &script, 300);

    assert_eq!(result.timeline.to_morse_string(keyer.timing()), "..");
}

#[test]
fn test_straight_ignores_memory_during_dot() {
    // The dash paddle touched during an automatic dot does not queue a dash
    let script = PaddleScript::new()
        .hold(PaddleSide::Left, 0, 10)
        .hold(PaddleSide::Right, 5, 8);
    let keyer = keyer(KeyerMode::Straight);
    let result = simulate(keyer, &script, 300);

    assert_eq!(result.timeline.to_morse_string(keyer.timing()), ".");
}

#[test]
fn test_letter_space_gap_is_three_dots() {
    let keyer = keyer_with(KeyerMode::IambicB, |config| config.letter_space = true);
    let script = PaddleScript::new()
        .hold(PaddleSide::Left, 0, 5)
        .hold(PaddleSide::Left, 45, 50);
    let result = simulate(keyer, &script, 400);

    // Second tap lands inside the letter space and waits it out
    assert_eq!(
        result.timeline.pulses(),
        [Pulse { start: 0, len: DOT }, Pulse { start: 80, len: DOT }]
    );
    assert_eq!(result.timeline.gaps(), [3 * DOT]);
}

#[test]
fn test_letter_space_memory_starts_next_element() {
    let keyer = keyer_with(KeyerMode::IambicA, |config| config.letter_space = true);
    let script = PaddleScript::new()
        .hold(PaddleSide::Right, 0, 5)
        .hold(PaddleSide::Left, 100, 104);
    let result = simulate(keyer, &script, 400);

    // Dash, element gap, then the extension; the dot press inside it is sent after
    assert_eq!(
        result.timeline.pulses(),
        [Pulse { start: 0, len: DASH }, Pulse { start: 120, len: DOT }]
    );
}

#[test]
fn test_without_letter_space_next_tap_is_immediate() {
    let script = PaddleScript::new()
        .hold(PaddleSide::Left, 0, 5)
        .hold(PaddleSide::Left, 45, 50);
    let result = simulate(keyer(KeyerMode::IambicB), &script, 400);

    assert_eq!(
        result.timeline.pulses(),
        [Pulse { start: 0, len: DOT }, Pulse { start: 45, len: DOT }]
    );
}

#[rstest]
#[case::iambic_a(KeyerMode::IambicA)]
#[case::iambic_b(KeyerMode::IambicB)]
fn test_reversed_paddles(#[case] mode: KeyerMode) {
    let keyer = keyer_with(mode, |config| config.paddles_reversed = true);
    let left = PaddleScript::new().hold(PaddleSide::Left, 0, 5);
    let right = PaddleScript::new().hold(PaddleSide::Right, 0, 5);

    let left_result = simulate(keyer, &left, 300);
    let right_result = simulate(keyer, &right, 300);

    assert_eq!(left_result.timeline.pulses(), [Pulse { start: 0, len: DASH }]);
    assert_eq!(right_result.timeline.pulses(), [Pulse { start: 0, len: DOT }]);
}

#[test]
fn test_reversed_straight_keys_on_left() {
    let keyer = keyer_with(KeyerMode::Straight, |config| config.paddles_reversed = true);
    let script = PaddleScript::new().hold(PaddleSide::Left, 20, 33);
    let result = simulate(keyer, &script, 200);

    assert_eq!(result.timeline.pulses(), [Pulse { start: 20, len: 13 }]);
}

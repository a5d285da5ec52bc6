//! ButtonPanel against mocked input lines.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};
use firmware::input::{Button, ButtonPanel, InputDevice, InputEvent};

fn pin(reads: &[State]) -> PinMock {
    let transactions: Vec<Transaction> = reads.iter().map(|&state| Transaction::get(state)).collect();
    PinMock::new(&transactions)
}

fn finish(panel: ButtonPanel<PinMock>) {
    let (mut left, mut middle, mut right) = panel.release();
    left.done();
    middle.done();
    right.done();
}

#[test]
fn test_no_button_held() {
    let mut panel = ButtonPanel::new(pin(&[State::High]), pin(&[State::High]), pin(&[State::High]));
    assert_eq!(panel.poll_event(), None);
    finish(panel);
}

#[test]
fn test_low_line_reads_as_press() {
    let mut panel = ButtonPanel::new(pin(&[State::High]), pin(&[State::Low]), pin(&[]));
    assert_eq!(panel.poll_event(), Some(InputEvent::ButtonPress(Button::Middle)));
    finish(panel);
}

#[test]
fn test_left_wins_and_stops_the_scan() {
    let mut panel = ButtonPanel::new(pin(&[State::Low]), pin(&[]), pin(&[]));
    assert_eq!(panel.pressed(), Some(Button::Left));
    finish(panel);
}

#[test]
fn test_held_button_repeats_on_every_poll() {
    let mut panel = ButtonPanel::new(
        pin(&[State::High, State::High, State::High]),
        pin(&[State::High, State::High, State::High]),
        pin(&[State::Low, State::Low, State::High]),
    );
    assert_eq!(panel.pressed(), Some(Button::Right));
    assert_eq!(panel.pressed(), Some(Button::Right));
    assert_eq!(panel.pressed(), None);
    finish(panel);
}

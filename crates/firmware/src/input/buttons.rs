//! Three push buttons read as levels.
//!
//! Buttons short their line to ground, so a low level means pressed. A poll
//! reads the lines in [`Button::ALL`] order and reports the first one held;
//! the rest are not sampled. Holding a button keeps reporting it, once per
//! poll. The menu loop waits [`DEBOUNCE_MS`] after every handled press, which
//! both debounces the contact and sets the auto-repeat rate.

use embedded_hal::digital::InputPin;
use platform::config::BUTTON_DEBOUNCE_MS;

use super::{Button, InputDevice, InputEvent};

/// Pause after a handled press before the keypad is polled again.
pub const DEBOUNCE_MS: u32 = BUTTON_DEBOUNCE_MS;

/// The keypad: one active-low input per button.
pub struct ButtonPanel<P> {
    left: P,
    middle: P,
    right: P,
}

impl<P: InputPin> ButtonPanel<P> {
    /// Wrap the three button inputs. Pull-ups must already be enabled.
    pub fn new(left: P, middle: P, right: P) -> Self {
        Self { left, middle, right }
    }

    /// First button currently held, in scan order.
    pub fn pressed(&mut self) -> Option<Button> {
        Button::ALL.into_iter().find(|&button| self.is_held(button))
    }

    fn is_held(&mut self, button: Button) -> bool {
        let pin = match button {
            Button::Left => &mut self.left,
            Button::Middle => &mut self.middle,
            Button::Right => &mut self.right,
        };
        // A line that cannot be read counts as released.
        pin.is_low().unwrap_or(false)
    }

    /// Release the pins as `(left, middle, right)`.
    pub fn release(self) -> (P, P, P) {
        (self.left, self.middle, self.right)
    }
}

impl<P: InputPin> InputDevice for ButtonPanel<P> {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.pressed().map(InputEvent::ButtonPress)
    }
}

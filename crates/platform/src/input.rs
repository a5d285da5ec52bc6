//! Input device abstraction

/// Input device trait for the keypad
pub trait InputDevice {
    /// Poll for event (non-blocking)
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Input events from the keypad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    /// Button pressed
    ButtonPress(Button),
}

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Advance the selection to the next entry
    Left,
    /// Enter a directory, or start / pause / resume playback
    Middle,
    /// Move the selection back to the previous entry
    Right,
}

impl Button {
    /// All buttons in scan priority order (first pressed wins).
    pub const ALL: [Button; 3] = [Button::Left, Button::Middle, Button::Right];
}

//! Keypad driver.
//!
//! | Signal | MCU pin | Notes                        |
//! |--------|---------|------------------------------|
//! | Left   | PC0     | Active-low, internal pull-up |
//! | Middle | PC1     | Active-low, internal pull-up |
//! | Right  | PC2     | Active-low, internal pull-up |
//!
//! [`ButtonPanel`] implements [`platform::InputDevice`], so the menu loop is
//! identical on every target.

// Re-export the trait and event types so callers only need `firmware::input`.
pub use platform::{Button, InputDevice, InputEvent};

pub mod buttons;
pub use buttons::ButtonPanel;

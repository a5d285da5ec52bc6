//! WAV player firmware
//!
//! Board glue for the STM32H743: the sample and refill timers, the 8-bit
//! parallel DAC, the three-button keypad, the SD card and the text console.
//! The player and the menu themselves live in `playback` and `ui`.
//!
//! # Architecture
//!
//! ```text
//! main.rs (embassy executor, menu loop, TIM6/TIM7 interrupts)
//!         ↓
//! ui::Controller ── player::SharedPlayer ── playback::PlaybackEngine
//!         ↓
//! Board drivers (audio, input, display, timers)
//!         ↓
//! Embassy HAL + PAC, embedded-sdmmc
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the STM32H743 target (embassy, defmt, SD card)
//! - `std` - Host backends from `platform`
//!
//! Everything outside `hardware` builds and is tested on the host.
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf -p firmware --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod audio;
pub mod boot;
pub mod display;
pub mod exception_handlers;
pub mod input;
pub mod player;

#[cfg(feature = "hardware")]
pub mod sdcard;
#[cfg(feature = "hardware")]
pub mod timers;

// Re-export key types
pub use audio::ParallelDac;
pub use display::{GraphicsConsole, LineConsole};
pub use input::ButtonPanel;
pub use player::{PlayerCell, SharedPlayer};

#[cfg(feature = "hardware")]
pub use audio::PortDac;
#[cfg(feature = "hardware")]
pub use timers::BasicTimer;

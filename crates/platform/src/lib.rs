//! Hardware Abstraction Layer (HAL) for the WAV player
//!
//! This crate provides trait-based abstractions for every peripheral the
//! player touches, so the playback engine and the menu can be developed and
//! tested on the host without a board.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Feature Layers (playback, ui)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC, embedded-sdmmc)
//! ```
//!
//! # Peripherals
//!
//! - [`Storage`] / [`File`] - FAT volume access (blocking, bounded latency)
//! - [`SampleOutput`] - one-byte-per-tick DAC output
//! - [`PeriodicTimer`] - the sample clock and the refill clock
//! - [`InputDevice`] - three-button keypad
//! - [`TextDisplay`] - line-oriented menu/status text
//!
//! # Features
//!
//! - `std`: host backends ([`storage_local`]) and `std::error::Error` impls
//! - `sdmmc`: SD card backend on top of `embedded-sdmmc`
//! - `hardware`: physical hardware target (implies `sdmmc`)
//! - `defmt`: `defmt::Format` derives
//!
//! # Example
//!
//! ```ignore
//! use platform::mocks::MockStorage;
//! use platform::{File, Storage};
//!
//! let mut storage = MockStorage::new();
//! storage.add_file("/a.wav", &[1, 2, 3]);
//! let mut file = storage.open_file("/a.wav").unwrap();
//! let mut buf = [0u8; 3];
//! assert_eq!(file.read(&mut buf).unwrap(), 3);
//! assert!(file.is_eof());
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register and pin names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors - callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod config;
pub mod display;
pub mod input;
pub mod storage;
pub mod timer;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

#[cfg(feature = "std")]
pub mod storage_local;

#[cfg(feature = "sdmmc")]
pub mod storage_sdmmc;

// Re-export main high-level traits
pub use audio::SampleOutput;
pub use display::{DisplayError, TextDisplay, TextStyle};
pub use input::{Button, InputDevice, InputEvent};
pub use storage::{DirEntry, File, Storage};
pub use timer::{PeriodicTimer, TimerTicks};

//! Menu layer: directory browser, status screens and the button controller.
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

// Must stay first so the log macros are visible to the modules below.
mod fmt;

pub mod controller;
pub mod navigation;
pub mod screen;

pub use controller::{Command, Controller};
pub use navigation::{Browser, PathTooLong};
pub use screen::Screen;

/// Errors surfaced to the menu loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiError<SE, DE> {
    /// Listing or opening failed
    Storage(SE),
    /// Drawing failed
    Display(DE),
    /// A path would exceed the path capacity
    PathTooLong,
}

impl<SE: core::fmt::Debug, DE: core::fmt::Debug> core::fmt::Display for UiError<SE, DE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "storage error: {err:?}"),
            Self::Display(err) => write!(f, "display error: {err:?}"),
            Self::PathTooLong => write!(f, "path too long"),
        }
    }
}

//! Audio output: the 8-bit R-2R ladder on GPIOD[0..7].
//!
//! # Dependency Injection
//!
//! The engine targets [`platform::SampleOutput`]. Concrete types are
//! injected at the call site:
//!
//! ```rust,ignore
//! // Hardware: one BSRR store per sample
//! PlaybackEngine::new(sample_clock, refill_clock, PortDac::new(pins), config);
//! // Tests / other boards: any eight embedded-hal output pins
//! PlaybackEngine::new(sample_clock, refill_clock, ParallelDac::new(pins), config);
//! ```

pub mod dac;

pub use dac::{bsrr_word, ParallelDac};

#[cfg(feature = "hardware")]
pub use dac::PortDac;

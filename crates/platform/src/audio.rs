//! Audio output abstraction
//!
//! The player drives an 8-bit DAC one sample at a time from the sample-clock
//! interrupt. Implementations must be infallible and branch-free in the
//! common case: a missed or late write is audible.

/// A DAC that latches one unsigned 8-bit sample per call.
pub trait SampleOutput {
    /// Latch `sample` on the output. The level holds until the next call.
    fn write_sample(&mut self, sample: u8);
}

impl<T: SampleOutput + ?Sized> SampleOutput for &mut T {
    fn write_sample(&mut self, sample: u8) {
        (**self).write_sample(sample);
    }
}

/// Mid-scale level for unsigned 8-bit PCM (silence).
pub const SILENCE: u8 = 0x80;

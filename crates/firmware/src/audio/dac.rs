//! Parallel DAC drivers.
//!
//! Bit `n` of the sample drives data line `n`; the resistor ladder turns the
//! byte into a level between 0 V (0x00) and the supply (0xFF).

use embedded_hal::digital::{OutputPin, PinState};
use platform::SampleOutput;

const BIT_MASKS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// DAC over eight independent output pins, least significant bit first.
///
/// The lines change one after another, so the output passes through
/// intermediate codes for a few nanoseconds on every sample.
pub struct ParallelDac<P> {
    pins: [P; 8],
    last: Option<u8>,
}

impl<P: OutputPin> ParallelDac<P> {
    /// Wrap the data lines, `pins[0]` being the least significant bit.
    pub fn new(pins: [P; 8]) -> Self {
        Self { pins, last: None }
    }

    /// Last sample written, if any.
    pub fn last_sample(&self) -> Option<u8> {
        self.last
    }

    /// Release the pins.
    pub fn release(self) -> [P; 8] {
        self.pins
    }
}

impl<P: OutputPin> SampleOutput for ParallelDac<P> {
    fn write_sample(&mut self, sample: u8) {
        for (mask, pin) in BIT_MASKS.iter().zip(self.pins.iter_mut()) {
            let high = sample & mask != 0;
            // GPIO writes cannot fail on this board; a failing line only
            // distorts the level until the next sample.
            let _ = pin.set_state(PinState::from(high));
        }
        self.last = Some(sample);
    }
}

/// Bit set/reset word that drives the low byte of a GPIO port to `sample`
/// in one store, leaving the upper eight lines untouched.
#[allow(clippy::arithmetic_side_effects, clippy::cast_lossless)] // 8 bits shifted by 16
pub const fn bsrr_word(sample: u8) -> u32 {
    let set = sample as u32;
    let reset = (!sample) as u32;
    set | (reset << 16)
}

#[cfg(feature = "hardware")]
pub use port::PortDac;

#[cfg(feature = "hardware")]
mod port {
    use embassy_stm32::gpio::{AnyPin, Output};
    use embassy_stm32::pac;
    use platform::audio::SILENCE;
    use platform::SampleOutput;

    use super::bsrr_word;

    /// DAC on GPIOD[0..7], updated with a single BSRR write per sample.
    pub struct PortDac {
        // Kept so the lines stay configured as push-pull outputs.
        _pins: [Output<'static, AnyPin>; 8],
    }

    impl PortDac {
        /// Take ownership of PD0..PD7, already configured as outputs, and
        /// park the ladder at mid-scale.
        pub fn new(pins: [Output<'static, AnyPin>; 8]) -> Self {
            let mut dac = Self { _pins: pins };
            dac.write_sample(SILENCE);
            dac
        }
    }

    impl SampleOutput for PortDac {
        fn write_sample(&mut self, sample: u8) {
            pac::GPIOD.bsrr().write_value(pac::gpio::regs::Bsrr(bsrr_word(sample)));
        }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::bsrr_word;

    #[test]
    fn test_bsrr_word_sets_and_resets_low_byte() {
        assert_eq!(bsrr_word(0x00), 0x00FF_0000);
        assert_eq!(bsrr_word(0xFF), 0x0000_00FF);
        assert_eq!(bsrr_word(0x80), 0x007F_0080);
    }

    #[test]
    fn test_bsrr_word_never_touches_upper_lines() {
        for sample in 0..=u8::MAX {
            let word = bsrr_word(sample);
            assert_eq!(word & 0xFF00_FF00, 0);
            // every low line is either set or reset, never both
            assert_eq!((word & 0xFF) ^ ((word >> 16) & 0xFF), 0xFF);
        }
    }
}

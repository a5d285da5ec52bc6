//! Sample and refill clock periods for a stream.

use platform::TimerTicks;

/// Why no clock plan exists for a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Sample rate of zero
    ZeroRate,
    /// Refill period would round to zero ticks
    TooFast,
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroRate => write!(f, "sample rate is zero"),
            Self::TooFast => write!(f, "sample rate too high for the timer clock"),
        }
    }
}

/// Timer periods for one stream: the sample clock fires once per sample,
/// the refill clock `divisor` times as often so a slow storage read on one
/// refill tick is caught up on the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Ticks between sample interrupts
    pub sample_period: TimerTicks,
    /// Ticks between refill interrupts
    pub refill_period: TimerTicks,
}

impl ClockPlan {
    /// Periods for `sample_rate` on a timer counting at `timer_clock_hz`,
    /// rounded to the nearest tick.
    pub fn for_rate(timer_clock_hz: u32, sample_rate: u32, refill_divisor: u32) -> Result<Self, ClockError> {
        if sample_rate == 0 {
            return Err(ClockError::ZeroRate);
        }
        let sample = div_round(u64::from(timer_clock_hz), u64::from(sample_rate));
        let refill = div_round(sample, u64::from(refill_divisor.max(1)));
        let sample_period = to_ticks(sample)?;
        let refill_period = to_ticks(refill)?;
        Ok(Self {
            sample_period,
            refill_period,
        })
    }
}

fn to_ticks(ticks: u64) -> Result<TimerTicks, ClockError> {
    u32::try_from(ticks)
        .ok()
        .and_then(TimerTicks::new)
        .ok_or(ClockError::TooFast)
}

// denominator is non-zero at every call site
#[allow(clippy::arithmetic_side_effects)]
fn div_round(num: u64, den: u64) -> u64 {
    (num + den / 2) / den
}

//! Periodic timer abstraction
//!
//! Playback runs from two periodic interrupts: the sample clock and the
//! refill clock. A [`PeriodicTimer`] is the foreground's handle on one of
//! them; the interrupt handler itself lives in the firmware crate.
//!
//! Periods are expressed in ticks of the timer's kernel clock. Hardware
//! timers with a 16-bit reload register use [`TimerTicks::prescaled_u16`] to
//! split a long period into a prescaler and a reload value.

/// Timer period in kernel-clock ticks (always at least one tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct TimerTicks(u32);

impl TimerTicks {
    /// Wrap a tick count, returning `None` for zero.
    #[must_use]
    pub const fn new(ticks: u32) -> Option<Self> {
        if ticks == 0 {
            None
        } else {
            Some(Self(ticks))
        }
    }

    /// Return the period in ticks.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Split the period into `(prescaler, reload)` register values for a
    /// timer whose counter counts `prescaler + 1` kernel ticks per step and
    /// wraps after `reload + 1` steps.
    ///
    /// The prescaler is the smallest value that makes the reload fit in 16
    /// bits, so the rounding error stays below one prescaled step.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // divider >= 1, see below
    pub fn prescaled_u16(self) -> (u16, u16) {
        const STEPS: u32 = 1 << 16;
        // ticks >= 1, so divider >= 1.
        let divider = self.0.div_ceil(STEPS);
        let steps = self.0 / divider;
        // divider <= 2^16 because ticks < 2^32.
        #[allow(clippy::cast_possible_truncation)]
        let prescaler = divider.saturating_sub(1) as u16;
        // steps <= 2^16 by construction of `divider`.
        #[allow(clippy::cast_possible_truncation)]
        let reload = steps.saturating_sub(1) as u16;
        (prescaler, reload)
    }
}

/// Periodic interrupt source.
///
/// `start` arms the timer so that its interrupt fires every `period`;
/// `stop` disarms it. After `stop` returns no further interrupt of this
/// timer may start executing, which is what lets the foreground swap the
/// playback session safely.
pub trait PeriodicTimer {
    /// Arm (or re-arm) the timer with the given period.
    fn start(&mut self, period: TimerTicks);

    /// Disarm the timer. Idempotent.
    fn stop(&mut self);

    /// `true` while the timer is armed.
    fn is_running(&self) -> bool;
}

//! TIM6 / TIM7 as the playback clocks.
//!
//! The basic timers count the 200 MHz APB1 timer kernel clock. Their
//! counter and prescaler are 16 bits wide, so a period is split with
//! [`TimerTicks::prescaled_u16`] before it is loaded.
//!
//! TIM7 is the sample clock and TIM6 the refill clock. The sample
//! interrupt gets the higher priority.

use embassy_stm32::interrupt::{Interrupt, InterruptExt, Priority};
use embassy_stm32::pac;
use embassy_stm32::pac::timer::{vals, TimBasic};
use platform::{PeriodicTimer, TimerTicks};

/// Priority of the sample clock interrupt.
pub const SAMPLE_PRIORITY: Priority = Priority::P1;
/// Priority of the refill clock interrupt.
pub const REFILL_PRIORITY: Priority = Priority::P2;

/// A basic timer driving one playback interrupt.
pub struct BasicTimer {
    regs: TimBasic,
    irq: Interrupt,
    running: bool,
}

impl BasicTimer {
    /// TIM7 as the sample clock.
    pub fn sample_clock() -> Self {
        Self::new(pac::TIM7, Interrupt::TIM7, SAMPLE_PRIORITY)
    }

    /// TIM6 as the refill clock.
    pub fn refill_clock() -> Self {
        Self::new(pac::TIM6, Interrupt::TIM6_DAC, REFILL_PRIORITY)
    }

    fn new(regs: TimBasic, irq: Interrupt, priority: Priority) -> Self {
        pac::RCC.apb1lenr().modify(|w| {
            w.set_tim6en(true);
            w.set_tim7en(true);
        });
        regs.cr1().modify(|w| {
            w.set_cen(false);
            // Only overflow raises the update interrupt, not a UG reload.
            w.set_urs(vals::Urs::COUNTERONLY);
        });
        regs.dier().modify(|w| w.set_uie(true));
        irq.set_priority(priority);
        // SAFETY: the handler only touches the player cell, which is
        // protected by a critical section.
        unsafe { irq.enable() };
        Self {
            regs,
            irq,
            running: false,
        }
    }
}

/// Clear the update flag; first thing in each timer interrupt.
pub fn acknowledge(regs: TimBasic) {
    regs.sr().modify(|w| w.set_uif(false));
}

impl PeriodicTimer for BasicTimer {
    fn start(&mut self, period: TimerTicks) {
        let (prescaler, reload) = period.prescaled_u16();
        self.regs.cr1().modify(|w| w.set_cen(false));
        self.regs.psc().write_value(prescaler);
        self.regs.arr().write(|w| w.set_arr(reload));
        self.regs.cnt().write(|w| w.set_cnt(0));
        // Latch the prescaler now rather than at the first overflow.
        self.regs.egr().write(|w| w.set_ug(true));
        self.regs.cr1().modify(|w| w.set_cen(true));
        self.running = true;
    }

    fn stop(&mut self) {
        self.regs.cr1().modify(|w| w.set_cen(false));
        acknowledge(self.regs);
        self.irq.unpend();
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

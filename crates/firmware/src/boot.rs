//! Boot-time clock configuration for the STM32H743.
//!
//! Initialization order:
//!   1. Clock tree (PLL1 -> 400 MHz core, APB1 timers at 200 MHz)
//!   2. Playback timers: clocks enabled, interrupts unmasked, counters stopped
//!   3. SD card over SPI1 (400 kHz for card init, then full speed)
//!   4. Menu loop
//!
//! The playback engine computes its timer periods from
//! [`platform::config::TIMER_CLOCK_HZ`]; [`CLOCK_TREE`] is the single place
//! that has to agree with it.

/// Ordered list of boot steps for documentation and testing.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. RCC: HSI -> PLL1 -> 400 MHz sys, APB1 /2 (timer kernel 200 MHz)",
    "2. TIM6/TIM7: enable clocks, unmask TIM6_DAC and TIM7, counters stopped",
    "3. SPI1 + SD card: init at 400 kHz, raise to SD_SPI_HZ, mount volume 0",
    "4. Menu: list the root directory and poll the keypad",
];

/// SPI clock while the card is in identification mode.
pub const SD_INIT_SPI_HZ: u32 = 400_000;

/// SPI clock once the card is initialized.
pub const SD_SPI_HZ: u32 = 16_000_000;

/// Clock tree settings, kept as plain numbers so the arithmetic can be
/// checked on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTree {
    /// HSI oscillator frequency
    pub hsi_hz: u32,
    /// PLL1 input divider
    pub pll1_prediv: u32,
    /// PLL1 multiplier
    pub pll1_mul: u32,
    /// PLL1 P output divider (system clock)
    pub pll1_divp: u32,
    /// AHB prescaler
    pub ahb_div: u32,
    /// APB1 prescaler
    pub apb1_div: u32,
}

/// HSI (64 MHz) / 4 x 50 = 800 MHz VCO, / 2 = 400 MHz sys, AHB 200 MHz,
/// APB1 100 MHz.
pub const CLOCK_TREE: ClockTree = ClockTree {
    hsi_hz: 64_000_000,
    pll1_prediv: 4,
    pll1_mul: 50,
    pll1_divp: 2,
    ahb_div: 2,
    apb1_div: 2,
};

// Evaluated on constants; the tests pin every result.
#[allow(clippy::arithmetic_side_effects)]
impl ClockTree {
    /// Core clock.
    pub const fn sys_hz(&self) -> u32 {
        self.hsi_hz / self.pll1_prediv * self.pll1_mul / self.pll1_divp
    }

    /// APB1 peripheral clock.
    pub const fn apb1_hz(&self) -> u32 {
        self.sys_hz() / self.ahb_div / self.apb1_div
    }

    /// Kernel clock of the APB1 timers (TIM2..TIM7). With TIMPRE clear the
    /// timers run at twice the bus clock whenever the APB prescaler is not 1.
    pub const fn apb1_timer_hz(&self) -> u32 {
        if self.apb1_div == 1 {
            self.apb1_hz()
        } else {
            self.apb1_hz() * 2
        }
    }
}

/// Build the embassy-stm32 configuration matching [`CLOCK_TREE`].
///
/// Always call `embassy_stm32::init(build_embassy_config())` from `main.rs`;
/// the default configuration leaves the core on HSI and the playback timers
/// at 64 MHz, so every sample rate would play about three times too slow.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::{
        AHBPrescaler, APBPrescaler, HSIPrescaler, Pll, PllDiv, PllMul, PllPreDiv, PllSource, Sysclk, VoltageScale,
    };

    let mut config = embassy_stm32::Config::default();

    // HSI: 64 MHz internal oscillator (no prescaler)
    config.rcc.hsi = Some(HSIPrescaler::DIV1);

    // HSI (64 MHz) / prediv(4) = 16 MHz -> x mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz -> system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz, timers 200 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz, SPI1 kernel
    config.rcc.apb3_pre = APBPrescaler::DIV2;
    config.rcc.apb4_pre = APBPrescaler::DIV2;
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::config::TIMER_CLOCK_HZ;

    #[test]
    fn test_boot_sys_clock_is_400mhz() {
        assert_eq!(CLOCK_TREE.sys_hz(), 400_000_000);
    }

    #[test]
    fn test_boot_timer_clock_matches_playback_config() {
        assert_eq!(CLOCK_TREE.apb1_hz(), 100_000_000);
        assert_eq!(CLOCK_TREE.apb1_timer_hz(), TIMER_CLOCK_HZ);
    }

    #[test]
    fn test_boot_undivided_apb_timers_run_at_bus_clock() {
        let tree = ClockTree {
            apb1_div: 1,
            ..CLOCK_TREE
        };
        assert_eq!(tree.apb1_timer_hz(), tree.apb1_hz());
    }

    #[test]
    fn test_boot_sd_clocks_ordered() {
        assert!(SD_INIT_SPI_HZ <= 400_000, "SD identification mode is limited to 400 kHz");
        assert!(SD_SPI_HZ > SD_INIT_SPI_HZ);
    }

    #[test]
    fn test_boot_sequence_starts_with_clocks() {
        assert!(BOOT_SEQUENCE_STEPS.first().is_some_and(|s| s.contains("RCC")));
        assert!(BOOT_SEQUENCE_STEPS.last().is_some_and(|s| s.contains("Menu")));
    }
}

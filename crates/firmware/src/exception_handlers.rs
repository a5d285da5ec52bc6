//! Cortex-M exception handlers.
//!
//! A HardFault here is almost always a stack overflow from an interrupt
//! handler or a bad access in the PAC timer code. The handler reports the
//! stacked frame over RTT and halts.
//!
//! The `#[cortex_m_rt::exception]` attribute requires the ARM target, so the
//! handler is gated behind `hardware`; [`HARDFAULT_DEFINED`] compiles
//! everywhere so host tests can check the module is linked in.

/// Marker constant, `true` when this module is part of the build.
pub const HARDFAULT_DEFINED: bool = true;

/// HardFault exception handler (hardware target only).
///
/// # Safety
///
/// Must never return; returning from a HardFault handler is undefined
/// behaviour on Cortex-M. The `-> !` return type enforces this.
#[cfg(feature = "hardware")]
#[cortex_m_rt::exception]
#[allow(unsafe_code)]
unsafe fn HardFault(ef: &cortex_m_rt::ExceptionFrame) -> ! {
    defmt::panic!(
        "HardFault at pc=0x{:08X} lr=0x{:08X}",
        ef.pc(),
        ef.lr()
    );
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_hardfault_module_present() {
        assert!(super::HARDFAULT_DEFINED);
    }
}

//! Application configuration and constants
//!
//! Central configuration values used across the workspace. Everything that
//! would otherwise be a magic number in the engine, the menu or the board
//! glue references these constants instead.

/// The application name
pub const APP_NAME: &str = "WAV Player";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Root of the FAT volume; the menu starts here.
pub const ROOT_PATH: &str = "/";

/// Path separator used both for display and by the storage backends.
pub const PATH_SEPARATOR: char = '/';

/// Label shown for the parent directory entry.
pub const PARENT_DIRECTORY: &str = "..";

/// Capacity, in bytes, of a full path (directory + separator + name).
pub const MAX_PATH_LEN: usize = 64;

/// Capacity, in bytes, of a single directory entry name.
pub const MAX_NAME_LEN: usize = 32;

/// Streaming buffer size in bytes. Power of two; one slot stays reserved,
/// so at most `FIFO_CAPACITY - 1` bytes are ever buffered.
pub const FIFO_CAPACITY: usize = 256;

/// The refill clock runs this many times faster than the sample clock.
pub const REFILL_DIVISOR: u32 = 5;

/// Button debounce delay applied after a handled key press.
pub const BUTTON_DEBOUNCE_MS: u32 = 50;

/// Kernel clock of the basic timers driving playback (APB1 timer clock on
/// the STM32H743 at the default 400 MHz system clock).
pub const TIMER_CLOCK_HZ: u32 = 200_000_000;

/// Title line of the boot screen
pub const fn app_title() -> &'static str {
    APP_NAME
}

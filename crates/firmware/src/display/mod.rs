//! Text displays for the menu and the status screens.
//!
//! - [`GraphicsConsole`] draws lines with a 6x10 monospace font on any
//!   `embedded-graphics` RGB565 target. No panel is wired on the board yet,
//!   so it is exercised on the host (`MockDisplay`).
//! - [`LineConsole`] assembles each line and hands it to a sink; on the
//!   board the sink is the RTT log.
//!
//! Both implement [`platform::TextDisplay`].

pub mod console;
pub mod line_console;

pub use console::{GraphicsConsole, LINE_HEIGHT};
pub use line_console::{LineConsole, LINE_CAPACITY};

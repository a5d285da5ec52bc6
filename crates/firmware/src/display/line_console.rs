//! Text display that emits whole lines to a sink.
//!
//! Styles become a two-character prefix so the listing still reads in a
//! plain log:
//!
//! ```text
//! ----
//!   /intro.wav
//! > /jazz/take5.wav
//! ```
//!
//! `>>` marks a selected directory. The prefix comes from the first segment
//! of the line. Text past [`LINE_CAPACITY`] bytes is dropped.

use heapless::String;
use platform::{DisplayError, TextDisplay, TextStyle};

/// Longest line the console keeps.
pub const LINE_CAPACITY: usize = 96;

/// Line emitted for [`TextDisplay::clear`].
pub const CLEAR_MARKER: &str = "----";

const fn prefix(style: TextStyle) -> &'static str {
    match style {
        TextStyle::Normal => "  ",
        TextStyle::Selected => "> ",
        TextStyle::SelectedDirectory => ">>",
        TextStyle::Label => "",
    }
}

/// Console that hands each finished line to `sink`.
pub struct LineConsole<F> {
    sink: F,
    line: String<LINE_CAPACITY>,
    started: bool,
    truncated: bool,
}

impl<F: FnMut(&str)> LineConsole<F> {
    /// Emit lines through `sink`.
    pub fn new(sink: F) -> Self {
        Self {
            sink,
            line: String::new(),
            started: false,
            truncated: false,
        }
    }

    /// `true` if text was dropped since the last [`TextDisplay::clear`].
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn push(&mut self, text: &str) {
        for ch in text.chars() {
            if self.line.push(ch).is_err() {
                self.truncated = true;
                return;
            }
        }
    }
}

impl<F: FnMut(&str)> TextDisplay for LineConsole<F> {
    type Error = DisplayError;

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.line.clear();
        self.started = false;
        self.truncated = false;
        (self.sink)(CLEAR_MARKER);
        Ok(())
    }

    fn write_str(&mut self, text: &str, style: TextStyle) -> Result<(), DisplayError> {
        if !self.started {
            self.push(prefix(style));
            self.started = true;
        }
        self.push(text);
        Ok(())
    }

    fn newline(&mut self) -> Result<(), DisplayError> {
        (self.sink)(&self.line);
        self.line.clear();
        self.started = false;
        Ok(())
    }
}

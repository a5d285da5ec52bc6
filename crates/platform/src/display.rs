//! Display abstraction layer
//!
//! The menu and the status screens are plain lines of text. A
//! [`TextDisplay`] renders them top to bottom; the firmware provides one
//! backed by `embedded-graphics` and one that mirrors lines to the RTT log.

/// Line style, mapped to colours by the concrete display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextStyle {
    /// Regular list entry
    Normal,
    /// Selected file entry
    Selected,
    /// Selected directory entry
    SelectedDirectory,
    /// Field label or screen title
    Label,
}

/// Line-oriented text output.
pub trait TextDisplay {
    /// Error type for display operations
    type Error: core::fmt::Debug;

    /// Clear the screen and move the cursor to the first line.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Write `text` at the cursor in `style` without ending the line.
    fn write_str(&mut self, text: &str, style: TextStyle) -> Result<(), Self::Error>;

    /// Move the cursor to the start of the next line.
    fn newline(&mut self) -> Result<(), Self::Error>;

    /// Write `text` followed by a line break.
    fn write_line(&mut self, text: &str, style: TextStyle) -> Result<(), Self::Error> {
        self.write_str(text, style)?;
        self.newline()
    }
}

/// Display errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error
    Communication,
    /// Text ran past the last line
    Overflow,
}

#[cfg(feature = "std")]
impl std::error::Error for DisplayError {}

impl core::fmt::Display for DisplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Communication => write!(f, "Display communication error"),
            Self::Overflow => write!(f, "Display text overflow"),
        }
    }
}

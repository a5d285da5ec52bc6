//! Line-oriented text on an `embedded-graphics` draw target.
//!
//! Host and test backend only: the board build shows the menu on the RTT
//! console through [`LineConsole`](super::LineConsole), and no panel driver
//! is wired in `main.rs`. Any RGB565 `DrawTarget` works here, which is how
//! the tests render the menu into a `MockDisplay`.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Dimensions, DrawTarget, Point, RgbColor};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use platform::{DisplayError, TextDisplay, TextStyle};

/// Height of one text line in pixels.
pub const LINE_HEIGHT: i32 = 10;

/// Screen background.
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Foreground and background colours for `style`.
pub const fn colors(style: TextStyle) -> (Rgb565, Rgb565) {
    match style {
        TextStyle::Normal => (Rgb565::WHITE, BACKGROUND),
        TextStyle::Selected => (Rgb565::BLACK, Rgb565::WHITE),
        TextStyle::SelectedDirectory => (Rgb565::BLACK, Rgb565::YELLOW),
        TextStyle::Label => (Rgb565::CYAN, BACKGROUND),
    }
}

fn text_style(style: TextStyle) -> MonoTextStyle<'static, Rgb565> {
    let (fg, bg) = colors(style);
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(fg)
        .background_color(bg)
        .build()
}

/// Text console over a colour draw target.
///
/// Lines run top to bottom; text past the right edge is clipped by the
/// target. Writing below the last full line fails with
/// [`DisplayError::Overflow`].
pub struct GraphicsConsole<D> {
    target: D,
    cursor: Point,
}

impl<D> GraphicsConsole<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Wrap `target`; call [`TextDisplay::clear`] before the first line.
    pub fn new(target: D) -> Self {
        Self {
            target,
            cursor: Point::zero(),
        }
    }

    /// Position where the next text starts.
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// The draw target.
    pub fn target(&self) -> &D {
        &self.target
    }

    /// Release the draw target.
    pub fn into_inner(self) -> D {
        self.target
    }

    fn line_fits(&self) -> bool {
        let bottom = self.target.bounding_box().bottom_right().map_or(-1, |p| p.y);
        self.cursor.y.saturating_add(LINE_HEIGHT).saturating_sub(1) <= bottom
    }
}

impl<D> TextDisplay for GraphicsConsole<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = DisplayError;

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.cursor = Point::zero();
        self.target.clear(BACKGROUND).map_err(|_| DisplayError::Communication)
    }

    fn write_str(&mut self, text: &str, style: TextStyle) -> Result<(), DisplayError> {
        if !self.line_fits() {
            return Err(DisplayError::Overflow);
        }
        self.cursor = Text::with_baseline(text, self.cursor, text_style(style), Baseline::Top)
            .draw(&mut self.target)
            .map_err(|_| DisplayError::Communication)?;
        Ok(())
    }

    fn newline(&mut self) -> Result<(), DisplayError> {
        self.cursor = Point::new(0, self.cursor.y.saturating_add(LINE_HEIGHT));
        Ok(())
    }
}

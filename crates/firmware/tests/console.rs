//! Text displays: the embedded-graphics console and the line console.
// Integration test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::arithmetic_side_effects)]

use embedded_graphics::mock_display::MockDisplay;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, RgbColor};
use firmware::display::console::{colors, BACKGROUND};
use firmware::display::{GraphicsConsole, LineConsole, LINE_CAPACITY, LINE_HEIGHT};
use platform::{DisplayError, TextDisplay, TextStyle};

fn console() -> GraphicsConsole<MockDisplay<Rgb565>> {
    let mut target = MockDisplay::new();
    target.set_allow_overdraw(true);
    target.set_allow_out_of_bounds_drawing(true);
    let mut console = GraphicsConsole::new(target);
    console.clear().unwrap();
    console
}

#[test]
fn test_clear_paints_background() {
    let console = console();
    assert_eq!(console.target().get_pixel(Point::new(0, 0)), Some(BACKGROUND));
    assert_eq!(console.target().get_pixel(Point::new(63, 63)), Some(BACKGROUND));
    assert_eq!(console.cursor(), Point::zero());
}

#[test]
fn test_lines_advance_by_line_height() {
    let mut console = console();
    console.write_line("ab", TextStyle::Normal).unwrap();
    assert_eq!(console.cursor(), Point::new(0, LINE_HEIGHT));
    console.write_str("cd", TextStyle::Normal).unwrap();
    assert_eq!(console.cursor(), Point::new(12, LINE_HEIGHT));
}

#[test]
fn test_selected_line_is_inverted() {
    let mut console = console();
    console.write_line("a", TextStyle::Normal).unwrap();
    console.write_line("a", TextStyle::Selected).unwrap();
    console.write_line("a", TextStyle::SelectedDirectory).unwrap();

    // top-left pixel of the 6x10 cell is background for lowercase glyphs
    assert_eq!(console.target().get_pixel(Point::new(0, 0)), Some(colors(TextStyle::Normal).1));
    assert_eq!(console.target().get_pixel(Point::new(0, LINE_HEIGHT)), Some(Rgb565::WHITE));
    assert_eq!(console.target().get_pixel(Point::new(0, 2 * LINE_HEIGHT)), Some(Rgb565::YELLOW));
}

#[test]
fn test_writing_below_last_line_overflows() {
    let mut console = console();
    // 64 px tall mock display holds six 10 px lines
    for _ in 0..6 {
        console.write_line("x", TextStyle::Normal).unwrap();
    }
    assert_eq!(console.write_str("x", TextStyle::Normal), Err(DisplayError::Overflow));

    console.clear().unwrap();
    console.write_line("x", TextStyle::Normal).unwrap();
}

#[test]
fn test_line_console_prefixes_by_style() {
    let mut lines = Vec::new();
    {
        let mut console = LineConsole::new(|line: &str| lines.push(line.to_string()));
        console.clear().unwrap();
        console.write_line("/a.wav", TextStyle::Normal).unwrap();
        console.write_line("/b.wav", TextStyle::Selected).unwrap();
        console.write_line("/jazz", TextStyle::SelectedDirectory).unwrap();
        console.write_str("Channels: ", TextStyle::Label).unwrap();
        console.write_line("1", TextStyle::Normal).unwrap();
    }
    assert_eq!(
        lines,
        vec!["----", "  /a.wav", "> /b.wav", ">>/jazz", "Channels: 1"]
    );
}

#[test]
fn test_line_console_truncates_long_lines() {
    let mut lines = Vec::new();
    let long = "x".repeat(LINE_CAPACITY * 2);
    let truncated;
    {
        let mut console = LineConsole::new(|line: &str| lines.push(line.len()));
        console.write_line(&long, TextStyle::Label).unwrap();
        truncated = console.truncated();
    }
    assert!(truncated);
    assert_eq!(lines, vec![LINE_CAPACITY]);
}

//! Status screens shown while a file is selected for playback.
//!
//! Layout, one item per line:
//!
//! ```text
//! Playing:
//! /music/take5.wav
//! Channels: 1
//! Sample rate: 8000
//! Bits per sample: 8
//! ```
//!
//! The format lines are left out when no header could be read.

use core::fmt::Write as _;

use heapless::String;
use platform::{TextDisplay, TextStyle};
use playback::AudioFormat;

/// Every status screen the controller can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// A session is playing.
    Playing,
    /// A session is paused.
    Paused,
    /// The session ended or was never started.
    Stopped,
    /// The selected file could not be played.
    Unplayable,
}

impl Screen {
    /// Title line of the screen.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Playing => "Playing:",
            Self::Paused => "Paused:",
            Self::Stopped => "Stopped:",
            Self::Unplayable => "Cannot play:",
        }
    }
}

/// Draw `screen` for the file at `path`.
pub fn render_status<D: TextDisplay>(
    display: &mut D,
    screen: Screen,
    path: &str,
    format: Option<&AudioFormat>,
) -> Result<(), D::Error> {
    display.clear()?;
    display.write_line(screen.label(), TextStyle::Label)?;
    display.write_line(path, TextStyle::Normal)?;
    if let Some(format) = format {
        render_field(display, "Channels: ", u32::from(format.channels))?;
        render_field(display, "Sample rate: ", format.sample_rate)?;
        render_field(display, "Bits per sample: ", u32::from(format.bits_per_sample))?;
    }
    Ok(())
}

fn render_field<D: TextDisplay>(display: &mut D, label: &str, value: u32) -> Result<(), D::Error> {
    let mut number: String<10> = String::new();
    // u32::MAX has 10 digits
    let _ = write!(number, "{value}");
    display.write_str(label, TextStyle::Label)?;
    display.write_line(&number, TextStyle::Normal)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::RecordingDisplay;

    #[test]
    fn test_playing_screen_lists_format() {
        let mut display = RecordingDisplay::new();
        render_status(&mut display, Screen::Playing, "/a.wav", Some(&AudioFormat::mono_u8(8000))).unwrap();
        assert_eq!(
            display.lines(),
            vec![
                "Playing:".to_string(),
                "/a.wav".to_string(),
                "Channels: 1".to_string(),
                "Sample rate: 8000".to_string(),
                "Bits per sample: 8".to_string(),
            ]
        );
        assert_eq!(display.line_style(0), Some(TextStyle::Label));
        assert_eq!(display.line_style(1), Some(TextStyle::Normal));
    }

    #[test]
    fn test_screen_without_format() {
        let mut display = RecordingDisplay::new();
        render_status(&mut display, Screen::Unplayable, "/broken.wav", None).unwrap();
        assert_eq!(display.lines(), vec!["Cannot play:".to_string(), "/broken.wav".to_string()]);
    }

    #[test]
    fn test_screen_labels() {
        assert_eq!(Screen::Paused.label(), "Paused:");
        assert_eq!(Screen::Stopped.label(), "Stopped:");
    }
}

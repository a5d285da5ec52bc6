//! Button handling: maps key presses to player and browser commands.
//!
//! | button | state                     | commands                  |
//! |--------|---------------------------|---------------------------|
//! | Left   | any session               | `Stop`, `SelectNext`      |
//! | Left   | idle                      | `SelectNext`              |
//! | Right  | playing                   | `Stop`, `SelectPrevious`  |
//! | Right  | paused or idle            | `SelectPrevious`          |
//! | Middle | `..` or directory         | `Enter`                   |
//! | Middle | file, playing             | `Pause`                   |
//! | Middle | file, paused              | `Resume`                  |
//! | Middle | file, idle                | `Play`                    |
//!
//! A paused session survives `Right`, so `Middle` on another file resumes
//! it rather than starting the new one.

use heapless::Vec;
use platform::{Button, InputDevice, InputEvent, Storage, TextDisplay};
use playback::{AudioFormat, PlaybackError, PlaybackEvent, PlayerControl};

use crate::navigation::{Browser, Path};
use crate::screen::{render_status, Screen};
use crate::UiError;

/// One step of a button action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Stop the session
    Stop,
    /// Select the next entry and redraw the listing
    SelectNext,
    /// Select the previous entry and redraw the listing
    SelectPrevious,
    /// Enter the selected directory (or `..`) and redraw
    Enter,
    /// Pause the session
    Pause,
    /// Resume the paused session
    Resume,
    /// Open the selected file and start it
    Play,
}

/// Commands for one press; at most two.
pub type Commands = Vec<Command, 2>;

struct NowPlaying {
    path: Path,
    format: Option<AudioFormat>,
}

/// The menu: owns the player handle, the volume and the display.
pub struct Controller<P, S, D> {
    player: P,
    storage: S,
    display: D,
    browser: Browser,
    now_playing: Option<NowPlaying>,
}

impl<P, S, D> Controller<P, S, D>
where
    S: Storage,
    P: PlayerControl<File = S::File>,
    D: TextDisplay,
{
    /// Create a controller browsing the volume root.
    pub fn new(player: P, storage: S, display: D) -> Self {
        Self {
            player,
            storage,
            display,
            browser: Browser::new(),
            now_playing: None,
        }
    }

    /// Draw the listing of the current directory.
    pub fn show_directory(&mut self) -> Result<(), UiError<S::Error, D::Error>> {
        self.browser.refresh(&mut self.storage, &mut self.display)
    }

    /// Commands a press of `button` stands for right now.
    pub fn commands_for(&self, button: Button) -> Commands {
        let mut commands = Commands::new();
        let (first, second) = match button {
            Button::Left => (
                self.player.current_session().is_some().then_some(Command::Stop),
                Some(Command::SelectNext),
            ),
            Button::Right => (
                self.player.is_playing().then_some(Command::Stop),
                Some(Command::SelectPrevious),
            ),
            Button::Middle if self.browser.selected_is_directory() => (Some(Command::Enter), None),
            Button::Middle if self.player.is_playing() => (Some(Command::Pause), None),
            Button::Middle if self.player.current_session().is_some() => (Some(Command::Resume), None),
            Button::Middle => (Some(Command::Play), None),
        };
        for command in [first, second].into_iter().flatten() {
            // capacity 2, at most two pushes
            let _ = commands.push(command);
        }
        commands
    }

    /// Run every command for a press of `button`.
    pub fn handle_button(&mut self, button: Button) -> Result<(), UiError<S::Error, D::Error>> {
        debug!("button {:?}", button);
        for command in self.commands_for(button) {
            self.execute(command)?;
        }
        Ok(())
    }

    /// Run one command.
    pub fn execute(&mut self, command: Command) -> Result<(), UiError<S::Error, D::Error>> {
        match command {
            Command::Stop => {
                self.player.stop();
                Ok(())
            }
            Command::SelectNext => {
                self.browser.select_next();
                self.show_directory()
            }
            Command::SelectPrevious => {
                self.browser.select_previous();
                self.show_directory()
            }
            Command::Enter => {
                self.browser.enter_selected().map_err(|_| UiError::PathTooLong)?;
                self.show_directory()
            }
            Command::Pause => {
                self.player.pause();
                self.show_status(Screen::Paused)
            }
            Command::Resume => {
                if self.player.resume().is_err() {
                    warn!("resume without a session");
                    return self.show_status(Screen::Stopped);
                }
                self.show_status(Screen::Playing)
            }
            Command::Play => self.play_selected(),
        }
    }

    fn play_selected(&mut self) -> Result<(), UiError<S::Error, D::Error>> {
        let path = self.browser.selected_path().map_err(|_| UiError::PathTooLong)?;
        let opened = self.storage.open_file(&path);
        self.now_playing = Some(NowPlaying { path, format: None });
        let file = match opened {
            Ok(file) => file,
            Err(_) => {
                warn!("open failed");
                return self.show_status(Screen::Unplayable);
            }
        };
        match self.player.start(file) {
            Ok(format) => {
                self.set_format(Some(format));
                self.show_status(Screen::Playing)
            }
            Err(PlaybackError::UnsupportedFormat(format)) => {
                self.set_format(Some(format));
                self.show_status(Screen::Unplayable)
            }
            Err(_) => {
                warn!("start failed");
                self.show_status(Screen::Unplayable)
            }
        }
    }

    fn set_format(&mut self, format: Option<AudioFormat>) {
        if let Some(now_playing) = self.now_playing.as_mut() {
            now_playing.format = format;
        }
    }

    fn show_status(&mut self, screen: Screen) -> Result<(), UiError<S::Error, D::Error>> {
        let (path, format) = match &self.now_playing {
            Some(now_playing) => (now_playing.path.as_str(), now_playing.format.as_ref()),
            None => ("", None),
        };
        render_status(&mut self.display, screen, path, format).map_err(UiError::Display)
    }

    /// Collect player notifications and redraw for them.
    pub fn poll_player(&mut self) -> Result<Option<PlaybackEvent>, UiError<S::Error, D::Error>> {
        let mut last = None;
        while let Some(event) = self.player.poll_event() {
            info!("player event: {:?}", event);
            match event {
                PlaybackEvent::Finished(_) => self.show_status(Screen::Stopped)?,
            }
            last = Some(event);
        }
        Ok(last)
    }

    /// One pass of the menu loop: player events first, then at most one
    /// button press.
    pub fn run_once<I: InputDevice>(&mut self, input: &mut I) -> Result<Option<Button>, UiError<S::Error, D::Error>> {
        self.poll_player()?;
        match input.poll_event() {
            Some(InputEvent::ButtonPress(button)) => {
                self.handle_button(button)?;
                Ok(Some(button))
            }
            None => Ok(None),
        }
    }

    /// The browser state.
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// The player handle.
    pub fn player(&self) -> &P {
        &self.player
    }

    /// The player handle, mutably.
    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// The display.
    pub fn display(&self) -> &D {
        &self.display
    }

    /// The volume.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

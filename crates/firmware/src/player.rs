//! The playback engine shared between the menu loop and the two timer
//! interrupts.
//!
//! The engine lives in a static [`PlayerCell`]: a critical-section mutex
//! around an `Option`, empty until `main` has built the engine from the
//! board peripherals. The TIM7 handler calls [`PlayerCell::on_sample_tick`],
//! the TIM6 handler [`PlayerCell::on_refill_tick`], and the menu drives the
//! engine through a [`SharedPlayer`] handle, which implements
//! [`PlayerControl`] so `ui::Controller` never sees the mutex.
//!
//! Every access runs inside a critical section, so the two interrupts and
//! the foreground never observe the engine mid-update. The refill handler
//! holds the section for one storage read.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use platform::{File, PeriodicTimer, SampleOutput};
use playback::{AudioFormat, PlaybackEngine, PlaybackError, PlaybackEvent, PlaybackState, PlayerControl, SessionInfo};

/// Static home of the playback engine.
pub struct PlayerCell<F, S, R, O>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<PlaybackEngine<F, S, R, O>>>>,
}

impl<F, S, R, O> PlayerCell<F, S, R, O>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    /// An empty cell, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Move `engine` into the cell. Hands it back if one is already there.
    pub fn install(&self, engine: PlaybackEngine<F, S, R, O>) -> Result<(), PlaybackEngine<F, S, R, O>> {
        self.inner.lock(|cell| {
            let Ok(mut slot) = cell.try_borrow_mut() else {
                return Err(engine);
            };
            if slot.is_some() {
                return Err(engine);
            }
            *slot = Some(engine);
            Ok(())
        })
    }

    /// `true` once an engine has been installed.
    pub fn is_installed(&self) -> bool {
        self.inner
            .lock(|cell| cell.try_borrow().map(|slot| slot.is_some()).unwrap_or(false))
    }

    /// Run `f` on the engine inside a critical section. `None` before
    /// [`install`](Self::install).
    pub fn with<T>(&self, f: impl FnOnce(&mut PlaybackEngine<F, S, R, O>) -> T) -> Option<T> {
        self.inner.lock(|cell| {
            let mut slot = cell.try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }

    /// Body of the sample clock interrupt.
    pub fn on_sample_tick(&self) {
        self.with(PlaybackEngine::sample_tick);
    }

    /// Body of the refill clock interrupt.
    pub fn on_refill_tick(&self) {
        self.with(PlaybackEngine::refill_tick);
    }

    /// Foreground handle for the menu.
    pub fn handle(&self) -> SharedPlayer<'_, F, S, R, O> {
        SharedPlayer { cell: self }
    }
}

impl<F, S, R, O> Default for PlayerCell<F, S, R, O>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    fn default() -> Self {
        Self::new()
    }
}

/// [`PlayerControl`] over a [`PlayerCell`].
///
/// Before an engine is installed the player reads as idle and `start`
/// fails with [`PlaybackError::NoSession`].
pub struct SharedPlayer<'a, F, S, R, O>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    cell: &'a PlayerCell<F, S, R, O>,
}

impl<F, S, R, O> PlayerControl for SharedPlayer<'_, F, S, R, O>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    type File = F;

    fn start(&mut self, file: F) -> Result<AudioFormat, PlaybackError<F::Error>> {
        self.cell
            .with(|engine| engine.start(file))
            .unwrap_or(Err(PlaybackError::NoSession))
    }

    fn pause(&mut self) {
        self.cell.with(PlaybackEngine::pause);
    }

    fn resume(&mut self) -> Result<(), PlaybackError<F::Error>> {
        self.cell
            .with(PlaybackEngine::resume)
            .unwrap_or(Err(PlaybackError::NoSession))
    }

    fn stop(&mut self) {
        self.cell.with(PlaybackEngine::stop);
    }

    fn state(&self) -> PlaybackState {
        self.cell.with(|engine| engine.state()).unwrap_or(PlaybackState::Idle)
    }

    fn current_session(&self) -> Option<SessionInfo> {
        self.cell.with(|engine| engine.current_session()).flatten()
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        self.cell.with(PlaybackEngine::poll_event).flatten()
    }
}

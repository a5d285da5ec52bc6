//! Interrupt-driven streaming playback.
//!
//! `PlaybackEngine` owns at most one session: an open WAV file, the byte
//! FIFO between storage and the DAC, and the two clock periods for the
//! stream. Three contexts drive it:
//!
//! - the foreground calls [`start`], [`pause`], [`resume`] and [`stop`],
//! - the sample clock interrupt calls [`sample_tick`] once per sample,
//! - the refill clock interrupt calls [`refill_tick`] several times per
//!   sample.
//!
//! `sample_tick` only pops (consumer side), `refill_tick` only pushes
//! (producer side). Neither blocks; the one storage read in `refill_tick`
//! is the only unbounded-by-construction work and is capped at the free
//! space of the FIFO.
//!
//! End of stream is not an error: once the file is exhausted and the FIFO
//! has drained, the next refill tick queues exactly one
//! [`PlaybackEvent::Finished`] and stops the session. A read error mid
//! stream ends the session the same way, after the bytes already buffered
//! have played.
//!
//! [`start`]: PlaybackEngine::start
//! [`pause`]: PlaybackEngine::pause
//! [`resume`]: PlaybackEngine::resume
//! [`stop`]: PlaybackEngine::stop
//! [`sample_tick`]: PlaybackEngine::sample_tick
//! [`refill_tick`]: PlaybackEngine::refill_tick

use heapless::Deque;
use platform::config::{FIFO_CAPACITY, REFILL_DIVISOR, TIMER_CLOCK_HZ};
use platform::{File, PeriodicTimer, SampleOutput};

use crate::clock::ClockPlan;
use crate::ring_buffer::RingBuffer;
use crate::wav::{AudioFormat, FormatError, WavFile};

/// Pending notifications the foreground has not collected yet.
const EVENT_QUEUE_LEN: usize = 4;

/// Current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackState {
    /// No session.
    Idle,
    /// Both clocks armed, samples flowing to the DAC.
    Playing,
    /// Session kept, clocks disarmed.
    Paused,
}

/// Why a session ended on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FinishReason {
    /// The file was played to its end.
    EndOfStream,
    /// Storage failed mid stream; buffered audio was still played.
    ReadError,
}

/// Notifications from interrupt context to the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackEvent {
    /// The session stopped itself. The engine is already `Idle`.
    Finished(FinishReason),
}

/// Errors returned by `PlaybackEngine` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlaybackError<E> {
    /// Header unreadable or malformed.
    Format(FormatError<E>),
    /// Header is valid but the stream cannot be played here. Carries the
    /// parsed layout so it can still be shown.
    UnsupportedFormat(AudioFormat),
    /// The priming read failed.
    Io(E),
    /// `resume` without a session.
    NoSession,
}

impl<E> From<FormatError<E>> for PlaybackError<E> {
    fn from(err: FormatError<E>) -> Self {
        Self::Format(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for PlaybackError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "could not start playback: {err}"),
            Self::UnsupportedFormat(format) => write!(
                f,
                "unsupported format: {} ch, {} Hz, {} bit",
                format.channels, format.sample_rate, format.bits_per_sample
            ),
            Self::Io(err) => write!(f, "read error while priming: {err:?}"),
            Self::NoSession => write!(f, "nothing to resume"),
        }
    }
}

/// Clock settings for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackConfig {
    /// Counting frequency of both playback timers.
    pub timer_clock_hz: u32,
    /// Refill ticks per sample tick.
    pub refill_divisor: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            timer_clock_hz: TIMER_CLOCK_HZ,
            refill_divisor: REFILL_DIVISOR,
        }
    }
}

/// Snapshot of the active session for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionInfo {
    /// Stream layout
    pub format: AudioFormat,
    /// Declared data chunk length
    pub data_size: u32,
    /// Clock periods in use
    pub clocks: ClockPlan,
    /// Bytes waiting in the FIFO
    pub buffered: usize,
    /// `true` while paused
    pub paused: bool,
    /// `true` once the file has no more bytes to give
    pub exhausted: bool,
}

#[derive(Debug)]
struct Session<F, const N: usize> {
    wav: WavFile<F>,
    buffer: RingBuffer<N>,
    clocks: ClockPlan,
    paused: bool,
    /// Set once the file can give no more bytes.
    finish: Option<FinishReason>,
}

impl<F: File, const N: usize> Session<F, N> {
    /// Move as many bytes as fit from the file into the FIFO.
    fn top_up(&mut self) -> Result<usize, F::Error> {
        let file = self.wav.file_mut();
        let mut producer = self.buffer.producer();
        let want = producer.free_space();
        let added = producer.refill_from(want, |buf| file.read(buf))?;
        if file.is_eof() || (added == 0 && want > 0) {
            self.finish = Some(FinishReason::EndOfStream);
        }
        Ok(added)
    }
}

/// Streams one WAV file at a time from storage to a sample output.
///
/// `S` is the sample clock, `R` the refill clock, `O` the DAC and `N` the
/// FIFO size (a power of two).
#[derive(Debug)]
pub struct PlaybackEngine<F, S, R, O, const N: usize = FIFO_CAPACITY>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    sample_clock: S,
    refill_clock: R,
    output: O,
    config: PlaybackConfig,
    session: Option<Session<F, N>>,
    events: Deque<PlaybackEvent, EVENT_QUEUE_LEN>,
    underruns: u32,
}

impl<F, S, R, O, const N: usize> PlaybackEngine<F, S, R, O, N>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    /// FIFO occupancy at or below which a refill tick reads from storage.
    pub const LOW_WATER_MARK: usize = N / 2;

    /// Create an idle engine. The clocks are expected to be disarmed.
    pub fn new(sample_clock: S, refill_clock: R, output: O, config: PlaybackConfig) -> Self {
        Self {
            sample_clock,
            refill_clock,
            output,
            config,
            session: None,
            events: Deque::new(),
            underruns: 0,
        }
    }

    /// Start playing `file` from its first sample.
    ///
    /// Any current session is stopped first and its pending events are
    /// discarded. On error the engine is left `Idle` and `file` has been
    /// dropped (closed).
    pub fn start(&mut self, file: F) -> Result<AudioFormat, PlaybackError<F::Error>> {
        self.stop();
        // Events from the previous session must not reach the new one.
        self.events.clear();

        let wav = WavFile::load(file)?;
        let format = wav.format();
        if !format.is_playable() {
            warn!(
                "unsupported format: {} ch, {} bit",
                format.channels,
                format.bits_per_sample
            );
            return Err(PlaybackError::UnsupportedFormat(format));
        }
        let clocks = ClockPlan::for_rate(
            self.config.timer_clock_hz,
            format.sample_rate,
            self.config.refill_divisor,
        )
        .map_err(|_| PlaybackError::UnsupportedFormat(format))?;

        let mut session = Session {
            wav,
            buffer: RingBuffer::new(),
            clocks,
            paused: false,
            finish: None,
        };
        // Prime before the sample clock runs, so the first tick has data.
        let primed = session.top_up().map_err(PlaybackError::Io)?;
        self.session = Some(session);
        self.underruns = 0;

        self.refill_clock.start(clocks.refill_period);
        self.sample_clock.start(clocks.sample_period);
        info!("playback started: {} Hz, {} bytes primed", format.sample_rate, primed);
        Ok(format)
    }

    /// Suspend output, keeping the session. No-op unless playing.
    pub fn pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.paused {
            return;
        }
        self.sample_clock.stop();
        self.refill_clock.stop();
        session.paused = true;
        debug!("playback paused");
    }

    /// Continue a paused session. No-op while playing.
    pub fn resume(&mut self) -> Result<(), PlaybackError<F::Error>> {
        let session = self.session.as_mut().ok_or(PlaybackError::NoSession)?;
        if !session.paused {
            return Ok(());
        }
        session.paused = false;
        self.refill_clock.start(session.clocks.refill_period);
        self.sample_clock.start(session.clocks.sample_period);
        debug!("playback resumed");
        Ok(())
    }

    /// Disarm both clocks and release the session. Idempotent.
    pub fn stop(&mut self) {
        if self.session.is_none() {
            return;
        }
        self.sample_clock.stop();
        self.refill_clock.stop();
        // Dropping the session closes the file.
        self.session = None;
        info!("playback stopped, {} underruns", self.underruns);
    }

    /// Sample clock handler: move one byte from the FIFO to the output.
    ///
    /// An empty FIFO leaves the output at its last level.
    pub fn sample_tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.paused {
            return;
        }
        match session.buffer.consumer().pop() {
            Some(sample) => self.output.write_sample(sample),
            None if session.finish.is_none() => {
                self.underruns = self.underruns.saturating_add(1);
            }
            None => {}
        }
    }

    /// Refill clock handler: top the FIFO up once it has drained to the
    /// low-water mark, and end the session once the file is exhausted and
    /// the FIFO is empty.
    pub fn refill_tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.paused {
            return;
        }
        if session.finish.is_none() && session.buffer.len() <= Self::LOW_WATER_MARK {
            if let Err(_err) = session.top_up() {
                warn!("read error mid stream, draining {} bytes", session.buffer.len());
                session.finish = Some(FinishReason::ReadError);
            }
        }
        if let Some(reason) = session.finish {
            if session.buffer.is_empty() {
                self.finish(reason);
            }
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        info!("stream finished: {:?}", reason);
        self.stop();
        if self.events.push_back(PlaybackEvent::Finished(reason)).is_err() {
            warn!("event queue full, dropping oldest");
            let _ = self.events.pop_front();
            let _ = self.events.push_back(PlaybackEvent::Finished(reason));
        }
    }

    /// Take the oldest pending notification.
    pub fn poll_event(&mut self) -> Option<PlaybackEvent> {
        self.events.pop_front()
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        match &self.session {
            None => PlaybackState::Idle,
            Some(session) if session.paused => PlaybackState::Paused,
            Some(_) => PlaybackState::Playing,
        }
    }

    /// `true` only while `Playing`.
    pub fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// The session, while `Playing` or `Paused`.
    pub fn current_session(&self) -> Option<SessionInfo> {
        self.session.as_ref().map(|session| SessionInfo {
            format: session.wav.format(),
            data_size: session.wav.data_size(),
            clocks: session.clocks,
            buffered: session.buffer.len(),
            paused: session.paused,
            exhausted: session.finish.is_some(),
        })
    }

    /// Sample ticks that found the FIFO empty before the stream ended.
    pub fn underruns(&self) -> u32 {
        self.underruns
    }

    /// Clock settings.
    pub fn config(&self) -> PlaybackConfig {
        self.config
    }

    /// The sample output.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// The sample output, mutably.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// The sample clock.
    pub fn sample_clock(&self) -> &S {
        &self.sample_clock
    }

    /// The refill clock.
    pub fn refill_clock(&self) -> &R {
        &self.refill_clock
    }
}

/// Foreground control surface of a player.
///
/// Implemented by the engine itself and by wrappers that share the engine
/// with interrupt handlers.
pub trait PlayerControl {
    /// File type the player streams from.
    type File: File;

    /// See [`PlaybackEngine::start`].
    fn start(&mut self, file: Self::File) -> Result<AudioFormat, PlaybackError<<Self::File as File>::Error>>;

    /// See [`PlaybackEngine::pause`].
    fn pause(&mut self);

    /// See [`PlaybackEngine::resume`].
    fn resume(&mut self) -> Result<(), PlaybackError<<Self::File as File>::Error>>;

    /// See [`PlaybackEngine::stop`].
    fn stop(&mut self);

    /// See [`PlaybackEngine::state`].
    fn state(&self) -> PlaybackState;

    /// `true` only while `Playing`.
    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// See [`PlaybackEngine::current_session`].
    fn current_session(&self) -> Option<SessionInfo>;

    /// See [`PlaybackEngine::poll_event`].
    fn poll_event(&mut self) -> Option<PlaybackEvent>;
}

impl<F, S, R, O, const N: usize> PlayerControl for PlaybackEngine<F, S, R, O, N>
where
    F: File,
    S: PeriodicTimer,
    R: PeriodicTimer,
    O: SampleOutput,
{
    type File = F;

    fn start(&mut self, file: F) -> Result<AudioFormat, PlaybackError<F::Error>> {
        PlaybackEngine::start(self, file)
    }

    fn pause(&mut self) {
        PlaybackEngine::pause(self);
    }

    fn resume(&mut self) -> Result<(), PlaybackError<F::Error>> {
        PlaybackEngine::resume(self)
    }

    fn stop(&mut self) {
        PlaybackEngine::stop(self);
    }

    fn state(&self) -> PlaybackState {
        PlaybackEngine::state(self)
    }

    fn current_session(&self) -> Option<SessionInfo> {
        PlaybackEngine::current_session(self)
    }

    fn poll_event(&mut self) -> Option<PlaybackEvent> {
        PlaybackEngine::poll_event(self)
    }
}

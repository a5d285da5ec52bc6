//! WAV streaming engine: byte FIFO, header parsing, timer-driven playback
//!
//! The pieces, leaf first:
//!
//! - [`ring_buffer`]: lock-free SPSC byte FIFO between the refill and the
//!   sample interrupt
//! - [`wav`]: canonical 44-byte header parsing
//! - [`clock`]: sample and refill timer periods for a rate
//! - [`engine`]: the session state machine and both tick handlers
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

// Must stay first so the log macros are visible to the modules below.
mod fmt;

pub mod clock;
pub mod engine;
pub mod ring_buffer;
pub mod wav;

pub use clock::{ClockError, ClockPlan};
pub use engine::{
    FinishReason, PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackEvent, PlaybackState, PlayerControl,
    SessionInfo,
};
pub use ring_buffer::{Overflow, RingBuffer};
pub use wav::{AudioFormat, FormatError, HeaderError, WavFile};

// Engine behaviour against the platform mocks. The tick-level scenarios
// live in tests/.
#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use platform::mocks::{MockFile, MockStorage, MockTimer, RecordingOutput};
    use platform::Storage;

    use crate::engine::{PlaybackConfig, PlaybackEngine, PlaybackError, PlaybackState};
    use crate::wav::{encode_header, AudioFormat};

    type Engine = PlaybackEngine<MockFile, MockTimer, MockTimer, RecordingOutput>;

    fn engine() -> Engine {
        PlaybackEngine::new(
            MockTimer::new(),
            MockTimer::new(),
            RecordingOutput::new(),
            PlaybackConfig::default(),
        )
    }

    fn storage_with(path: &str, format: AudioFormat, data: &[u8]) -> MockStorage {
        let mut storage = MockStorage::new();
        let mut bytes = encode_header(&format, u32::try_from(data.len()).unwrap()).to_vec();
        bytes.extend_from_slice(data);
        storage.add_file(path, &bytes);
        storage
    }

    /// State machine tests
    mod state_tests {
        use super::*;
        use platform::PeriodicTimer;

        #[test]
        fn test_engine_starts_idle() {
            let engine = engine();
            assert_eq!(engine.state(), PlaybackState::Idle);
            assert!(engine.current_session().is_none());
        }

        #[test]
        fn test_start_arms_refill_then_sample_clock() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            assert_eq!(engine.state(), PlaybackState::Playing);
            assert!(engine.sample_clock().is_running());
            assert!(engine.refill_clock().is_running());
            assert_eq!(engine.sample_clock().period().map(|p| p.get()), Some(25_000));
            assert_eq!(engine.refill_clock().period().map(|p| p.get()), Some(5_000));
        }

        #[test]
        fn test_start_primes_buffer() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 1000]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            let info = engine.current_session().unwrap();
            assert_eq!(info.buffered, 255);
            assert!(!info.exhausted);
        }

        #[test]
        fn test_pause_from_playing() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.pause();
            assert_eq!(engine.state(), PlaybackState::Paused);
            assert!(!engine.sample_clock().is_running());
            assert!(!engine.refill_clock().is_running());
            assert!(engine.current_session().unwrap().paused);
        }

        #[test]
        fn test_pause_is_idempotent() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.pause();
            engine.pause();
            assert_eq!(engine.sample_clock().stop_count(), 1);
            assert_eq!(engine.state(), PlaybackState::Paused);
        }

        #[test]
        fn test_pause_from_idle_is_noop() {
            let mut engine = engine();
            engine.pause();
            assert_eq!(engine.state(), PlaybackState::Idle);
            assert_eq!(engine.sample_clock().stop_count(), 0);
        }

        #[test]
        fn test_resume_from_idle_rejected() {
            let mut engine = engine();
            assert_eq!(engine.resume(), Err(PlaybackError::NoSession));
            assert_eq!(engine.state(), PlaybackState::Idle);
            assert_eq!(engine.sample_clock().start_count(), 0);
        }

        #[test]
        fn test_resume_rearms_clocks() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.pause();
            engine.resume().unwrap();
            assert_eq!(engine.state(), PlaybackState::Playing);
            assert_eq!(engine.sample_clock().start_count(), 2);
            assert!(engine.refill_clock().is_running());
        }

        #[test]
        fn test_resume_while_playing_is_noop() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.resume().unwrap();
            assert_eq!(engine.sample_clock().start_count(), 1);
        }

        #[test]
        fn test_stop_releases_file() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            assert_eq!(storage.open_handles(), 1);
            engine.stop();
            assert_eq!(engine.state(), PlaybackState::Idle);
            assert_eq!(storage.open_handles(), 0);
            assert!(!engine.sample_clock().is_running());
            engine.stop();
            assert_eq!(engine.state(), PlaybackState::Idle);
        }

        #[test]
        fn test_stop_from_paused() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.pause();
            engine.stop();
            assert_eq!(engine.state(), PlaybackState::Idle);
        }

        #[test]
        fn test_start_replaces_session() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            storage.add_file(
                "/b.wav",
                &[encode_header(&AudioFormat::mono_u8(16_000), 3).as_slice(), &[9, 9, 9]].concat(),
            );
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.start(storage.open_file("/b.wav").unwrap()).unwrap();
            assert_eq!(storage.stats("/a.wav").open_handles, 0);
            assert_eq!(storage.stats("/b.wav").open_handles, 1);
            assert_eq!(engine.current_session().unwrap().format.sample_rate, 16_000);
        }

        #[test]
        fn test_start_discards_finished_event_of_previous_session() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[7, 8]);
            storage.add_file(
                "/b.wav",
                &[encode_header(&AudioFormat::mono_u8(8000), 3).as_slice(), &[9, 9, 9]].concat(),
            );
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            engine.sample_tick();
            engine.sample_tick();
            engine.refill_tick();
            assert_eq!(engine.state(), PlaybackState::Idle);

            engine.start(storage.open_file("/b.wav").unwrap()).unwrap();
            assert_eq!(engine.state(), PlaybackState::Playing);
            assert_eq!(engine.poll_event(), None);
        }
    }

    /// Start failure tests
    mod start_error_tests {
        use super::*;
        use platform::PeriodicTimer;
        use crate::wav::{FormatError, HeaderError};

        #[test]
        fn test_unsupported_format_stays_idle() {
            let stereo = AudioFormat {
                channels: 2,
                sample_rate: 44_100,
                bits_per_sample: 16,
            };
            let mut storage = storage_with("/s.wav", stereo, &[0; 64]);
            let mut engine = engine();
            let result = engine.start(storage.open_file("/s.wav").unwrap());
            assert_eq!(result, Err(PlaybackError::UnsupportedFormat(stereo)));
            assert_eq!(engine.state(), PlaybackState::Idle);
            assert_eq!(storage.open_handles(), 0);
            assert!(!engine.sample_clock().is_running());
        }

        #[test]
        fn test_bad_header_is_format_error() {
            let mut storage = MockStorage::new();
            storage.add_file("/x.wav", b"not a wav file at all");
            let mut engine = engine();
            let result = engine.start(storage.open_file("/x.wav").unwrap());
            assert_eq!(
                result,
                Err(PlaybackError::Format(FormatError::Header(HeaderError::Truncated)))
            );
            assert_eq!(engine.state(), PlaybackState::Idle);
        }

        #[test]
        fn test_failed_start_stops_previous_session() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            storage.add_file("/bad.wav", &[0; 10]);
            let mut engine = engine();
            engine.start(storage.open_file("/a.wav").unwrap()).unwrap();
            assert!(engine.start(storage.open_file("/bad.wav").unwrap()).is_err());
            assert_eq!(engine.state(), PlaybackState::Idle);
            assert_eq!(storage.open_handles(), 0);
        }

        #[test]
        fn test_priming_read_error() {
            let mut storage = storage_with("/a.wav", AudioFormat::mono_u8(8000), &[1; 100]);
            storage.fail_reads_at("/a.wav", 44);
            let mut engine = engine();
            let result = engine.start(storage.open_file("/a.wav").unwrap());
            assert!(matches!(result, Err(PlaybackError::Io(_))));
            assert_eq!(engine.state(), PlaybackState::Idle);
        }
    }
}

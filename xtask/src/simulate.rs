//! xtask simulate: play a file through the real engine on the host.
//!
//! The two board timers are replaced by [`SimClock`]s on a shared virtual
//! time base. Whichever clock is due next fires its handler, refill first
//! on a tie, exactly as the interrupt priorities order them on the device.
//! Every byte the engine hands to the DAC is captured and can be written
//! out for listening or diffing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use platform::config::TIMER_CLOCK_HZ;
use platform::storage_local::LocalFile;
use platform::timer::TimerTicks;
use platform::{PeriodicTimer, SampleOutput};
use playback::wav::encode_header;
use playback::{AudioFormat, FinishReason, PlaybackConfig, PlaybackEngine, PlaybackEvent};
use tracing::{debug, info, warn};

use crate::track;

pub struct Options {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub wav: bool,
    pub max_samples: Option<u64>,
    pub refill_divisor: u32,
}

/// A periodic timer on virtual time.
#[derive(Debug, Default)]
pub struct SimClock {
    period: Option<TimerTicks>,
    running: bool,
}

impl SimClock {
    /// Period while armed.
    pub fn armed_period(&self) -> Option<u64> {
        self.period
            .filter(|_| self.running)
            .map(|p| u64::from(p.get()))
    }
}

impl PeriodicTimer for SimClock {
    fn start(&mut self, period: TimerTicks) {
        debug!(ticks = period.get(), "clock armed");
        self.period = Some(period);
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// DAC stand-in that keeps every sample.
#[derive(Debug, Default)]
pub struct SampleCapture {
    samples: Vec<u8>,
}

impl SampleCapture {
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

impl SampleOutput for SampleCapture {
    fn write_sample(&mut self, sample: u8) {
        self.samples.push(sample);
    }
}

pub type SimEngine = PlaybackEngine<LocalFile, SimClock, SimClock, SampleCapture>;

/// What one simulated run produced.
#[derive(Debug, PartialEq, Eq)]
pub struct Report {
    pub format: AudioFormat,
    pub sample_ticks: u64,
    pub refill_ticks: u64,
    pub underruns: u32,
    /// Virtual time at the last handled tick, in timer ticks.
    pub elapsed_ticks: u64,
    /// `None` when the run was cut short by `max_samples`.
    pub finish: Option<FinishReason>,
}

/// Entry point called from main.rs
pub fn run(options: &Options) -> Result<()> {
    println!();
    println!("{}", format!("▶ Simulating {}", options.file.display()).cyan().bold());

    let wall = Instant::now();
    let mut engine = SimEngine::new(
        SimClock::default(),
        SimClock::default(),
        SampleCapture::default(),
        PlaybackConfig {
            timer_clock_hz: TIMER_CLOCK_HZ,
            refill_divisor: options.refill_divisor,
        },
    );
    let report = simulate(&mut engine, track::open(&options.file)?, options.max_samples)?;
    let samples = engine.output().samples();

    println!("  Format:        {} ch, {} Hz, {} bit", report.format.channels, report.format.sample_rate, report.format.bits_per_sample);
    println!("  Sample ticks:  {}", report.sample_ticks);
    println!("  Refill ticks:  {}", report.refill_ticks);
    println!("  Samples out:   {}", samples.len());
    println!(
        "  Virtual time:  {:.3}s",
        report.elapsed_ticks as f64 / f64::from(TIMER_CLOCK_HZ)
    );
    if report.underruns == 0 {
        println!("{}", "  Underruns:     0".green());
    } else {
        println!("{}", format!("  Underruns:     {}", report.underruns).yellow());
    }
    match report.finish {
        Some(FinishReason::EndOfStream) => println!("{}", "  ✓ Played to the end".green()),
        Some(FinishReason::ReadError) => println!("{}", "  ✗ Stopped on a read error".red()),
        None => println!("{}", "  ⚠ Stopped at the sample limit".yellow()),
    }

    if let Some(path) = &options.output {
        write_output(path, samples, report.format.sample_rate, options.wav)?;
        println!("  Wrote {} bytes to {}", samples.len(), path.display());
    }

    println!(
        "{}",
        format!("✓ Simulation finished in {:.2}s", wall.elapsed().as_secs_f64()).green()
    );
    println!();
    Ok(())
}

/// Start `file` on `engine` and fire its clocks in virtual time until the
/// session finishes or `max_samples` sample ticks have run.
pub fn simulate(engine: &mut SimEngine, file: LocalFile, max_samples: Option<u64>) -> Result<Report> {
    let format = engine.start(file).map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(
        rate = format.sample_rate,
        sample_period = ?engine.sample_clock().armed_period(),
        refill_period = ?engine.refill_clock().armed_period(),
        "session started"
    );

    let mut report = Report {
        format,
        sample_ticks: 0,
        refill_ticks: 0,
        underruns: 0,
        elapsed_ticks: 0,
        finish: None,
    };
    let mut next_sample = engine.sample_clock().armed_period().unwrap_or(0);
    let mut next_refill = engine.refill_clock().armed_period().unwrap_or(0);

    loop {
        if let Some(PlaybackEvent::Finished(reason)) = engine.poll_event() {
            info!(?reason, samples = report.sample_ticks, "session finished");
            report.finish = Some(reason);
            break;
        }
        if max_samples.is_some_and(|max| report.sample_ticks >= max) {
            warn!(samples = report.sample_ticks, "sample limit reached, stopping");
            engine.stop();
            break;
        }
        let (Some(sample_period), Some(refill_period)) =
            (engine.sample_clock().armed_period(), engine.refill_clock().armed_period())
        else {
            warn!("clocks disarmed without a finish event");
            break;
        };

        if next_refill <= next_sample {
            report.elapsed_ticks = next_refill;
            engine.refill_tick();
            report.refill_ticks = report.refill_ticks.saturating_add(1);
            next_refill = next_refill.saturating_add(refill_period);
        } else {
            report.elapsed_ticks = next_sample;
            engine.sample_tick();
            report.sample_ticks = report.sample_ticks.saturating_add(1);
            next_sample = next_sample.saturating_add(sample_period);
        }
    }

    report.underruns = engine.underruns();
    Ok(report)
}

fn write_output(path: &Path, samples: &[u8], sample_rate: u32, wav: bool) -> Result<()> {
    let mut bytes = Vec::with_capacity(samples.len().saturating_add(playback::wav::HEADER_LEN));
    if wav {
        let size = u32::try_from(samples.len()).context("output too large for a WAV file")?;
        bytes.extend_from_slice(&encode_header(&AudioFormat::mono_u8(sample_rate), size));
    }
    bytes.extend_from_slice(samples);
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine(refill_divisor: u32) -> SimEngine {
        SimEngine::new(
            SimClock::default(),
            SimClock::default(),
            SampleCapture::default(),
            PlaybackConfig {
                timer_clock_hz: TIMER_CLOCK_HZ,
                refill_divisor,
            },
        )
    }

    fn wav_file(dir: &TempDir, name: &str, format: AudioFormat, data: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut bytes = encode_header(&format, u32::try_from(data.len()).unwrap()).to_vec();
        bytes.extend_from_slice(data);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_simulate_plays_every_byte_in_order() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let path = wav_file(&dir, "ramp.wav", AudioFormat::mono_u8(8000), &data);

        let mut engine = engine(5);
        let report = simulate(&mut engine, track::open(&path).unwrap(), None).unwrap();

        assert_eq!(report.finish, Some(FinishReason::EndOfStream));
        assert_eq!(report.underruns, 0);
        assert_eq!(engine.output().samples(), data.as_slice());
        assert!(report.refill_ticks >= report.sample_ticks * 4);
    }

    #[test]
    fn test_simulate_stops_at_sample_limit() {
        let dir = TempDir::new().unwrap();
        let path = wav_file(&dir, "long.wav", AudioFormat::mono_u8(8000), &[0x40; 2000]);

        let mut engine = engine(5);
        let report = simulate(&mut engine, track::open(&path).unwrap(), Some(100)).unwrap();

        assert_eq!(report.finish, None);
        assert_eq!(report.sample_ticks, 100);
        assert_eq!(engine.output().samples().len(), 100);
        assert_eq!(engine.state(), playback::PlaybackState::Idle);
    }

    #[test]
    fn test_simulate_rejects_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let stereo = AudioFormat {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
        };
        let path = wav_file(&dir, "cd.wav", stereo, &[0; 64]);

        let mut engine = engine(5);
        assert!(simulate(&mut engine, track::open(&path).unwrap(), None).is_err());
        assert!(engine.output().samples().is_empty());
    }

    #[test]
    fn test_write_output_wraps_in_wav_header() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.wav");
        write_output(&out, &[1, 2, 3], 8000, true).unwrap();

        let bytes = fs::read(&out).unwrap();
        let header = playback::wav::parse_header(&bytes).unwrap();
        assert_eq!(header.format, AudioFormat::mono_u8(8000));
        assert_eq!(header.data_size, 3);
        assert_eq!(bytes.len(), playback::wav::HEADER_LEN + 3);
    }

    #[test]
    fn test_write_output_raw() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.raw");
        write_output(&out, &[1, 2, 3], 8000, false).unwrap();
        assert_eq!(fs::read(&out).unwrap(), vec![1, 2, 3]);
    }
}

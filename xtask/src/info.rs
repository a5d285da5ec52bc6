use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use platform::config::{REFILL_DIVISOR, TIMER_CLOCK_HZ};
use playback::{ClockPlan, WavFile};

use crate::track;

pub fn run(path: &Path) -> Result<()> {
    let file = track::open(path)?;
    let wav = WavFile::load(file)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .with_context(|| format!("{} is not a WAV file", path.display()))?;
    let format = wav.format();

    println!("{}", path.display().to_string().bold());
    println!("  Channels:        {}", format.channels);
    println!("  Sample rate:     {} Hz", format.sample_rate);
    println!("  Bits per sample: {}", format.bits_per_sample);
    println!("  Data size:       {} bytes", wav.data_size());
    println!("  Duration:        {}", duration(format.sample_rate, wav.data_size()));

    if !format.is_playable() {
        println!("  {}", "Not playable: mono 8-bit PCM only".red());
        return Ok(());
    }
    match ClockPlan::for_rate(TIMER_CLOCK_HZ, format.sample_rate, REFILL_DIVISOR) {
        Ok(plan) => {
            println!("  {}", "Playable".green());
            println!(
                "  Sample period:   {} ticks @ {} MHz",
                plan.sample_period.get(),
                TIMER_CLOCK_HZ / 1_000_000
            );
            println!("  Refill period:   {} ticks", plan.refill_period.get());
        }
        Err(e) => println!("  {} {e}", "Not playable:".red()),
    }
    Ok(())
}

/// `m:ss.mmm` for `bytes` of mono 8-bit audio at `sample_rate`.
fn duration(sample_rate: u32, bytes: u32) -> String {
    let Some(millis) = u64::from(bytes)
        .saturating_mul(1000)
        .checked_div(u64::from(sample_rate))
    else {
        return "-".to_string();
    };
    format!("{}:{:02}.{:03}", millis / 60_000, millis / 1000 % 60, millis % 1000)
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats_minutes_and_millis() {
        assert_eq!(duration(8000, 8000), "0:01.000");
        assert_eq!(duration(8000, 8000 * 61 + 4000), "1:01.500");
    }

    #[test]
    fn duration_of_zero_rate() {
        assert_eq!(duration(0, 100), "-");
    }
}

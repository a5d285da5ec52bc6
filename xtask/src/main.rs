// Desktop tooling crate: unwrap/expect/panic are acceptable outside the firmware.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod doc;
mod flash;
mod info;
mod scan;
mod simulate;
mod test;
mod track;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "WAV player development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header of a WAV file and whether the player accepts it
    Info {
        /// WAV file to inspect
        file: PathBuf,
    },
    /// List every WAV file under a directory with its format
    Scan {
        /// Directory to walk (usually the SD card mount point)
        dir: PathBuf,
    },
    /// Play a file through the engine with simulated timer interrupts
    Simulate {
        /// WAV file to play
        file: PathBuf,
        /// Where to write the samples the DAC would have received
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write a WAV file instead of raw unsigned 8-bit samples
        #[arg(long)]
        wav: bool,
        /// Stop after this many sample ticks
        #[arg(long)]
        max_samples: Option<u64>,
        /// Refill ticks per sample tick
        #[arg(long, default_value_t = platform::config::REFILL_DIVISOR)]
        refill_divisor: u32,
    },
    /// Check firmware and library builds for the hardware and host targets
    Check,
    /// Run all tests (unit and integration)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Build and optionally open documentation
    Doc {
        /// Open documentation in browser
        #[arg(long)]
        open: bool,
    },
    /// Flash firmware to the STM32H743 through the probe-rs runner and show RTT
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { file } => info::run(&file),
        Commands::Scan { dir } => scan::run(&dir),
        Commands::Simulate {
            file,
            output,
            wav,
            max_samples,
            refill_divisor,
        } => simulate::run(&simulate::Options {
            file,
            output,
            wav,
            max_samples,
            refill_divisor,
        }),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Doc { open } => doc::run(open),
        Commands::Flash { release } => flash::run(release),
    }
}

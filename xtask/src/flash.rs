//! xtask flash: build the firmware and hand it to the probe-rs runner from
//! `.cargo/config.toml`. The runner stays attached and prints the RTT
//! console, so the menu shows up in this terminal.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;

/// Target triple of the STM32H743.
pub const TARGET: &str = "thumbv7em-none-eabihf";

/// Arguments for `cargo run` that build and flash the board binary.
pub fn cargo_args(release: bool) -> Vec<&'static str> {
    let mut args = vec!["run", "-p", "firmware", "--bin", "firmware", "--target", TARGET, "--features", "hardware"];
    if release {
        args.push("--release");
    }
    args
}

pub fn run(release: bool) -> Result<()> {
    let mode = if release { "release" } else { "debug" };
    println!();
    println!("{}", format!("📡 Flashing firmware ({mode})...").cyan().bold());
    println!("   {}", "Ctrl-C detaches; the player keeps running".dimmed());
    println!();

    // Inherit stdio so RTT output streams live.
    let status = Command::new("cargo")
        .args(cargo_args(release))
        .status()
        .context("Failed to run cargo. Is probe-rs installed? (cargo install probe-rs-tools)")?;

    if !status.success() {
        anyhow::bail!("Flash failed - check that the probe is connected and the board is powered");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flash_targets_board_with_hardware_feature() {
        let args = cargo_args(false);
        assert_eq!(args.first(), Some(&"run"));
        assert!(args.windows(2).any(|w| w == ["--target", TARGET]));
        assert!(args.windows(2).any(|w| w == ["--features", "hardware"]));
        assert!(!args.contains(&"--release"));
    }

    #[test]
    fn release_flag_is_forwarded() {
        assert_eq!(cargo_args(true).last(), Some(&"--release"));
    }
}

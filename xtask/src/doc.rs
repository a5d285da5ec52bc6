use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

/// Host crates are documented as-is; the firmware is documented for the
/// board so its `hardware`-only modules (timers, SD card, port DAC) show up.
pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Building documentation...".cyan().bold());
    println!();

    let start = Instant::now();

    let mut host = Command::new("cargo");
    host.args([
        "doc",
        "--no-deps",
        "--document-private-items",
        "-p",
        "platform",
        "-p",
        "playback",
        "-p",
        "ui",
    ]);
    if open {
        host.arg("--open");
    }
    build(host, "library")?;

    let mut board = Command::new("cargo");
    board.args([
        "doc",
        "--no-deps",
        "--document-private-items",
        "-p",
        "firmware",
        "--target",
        "thumbv7em-none-eabihf",
        "--features",
        "hardware",
    ]);
    build(board, "firmware")?;

    println!(
        "{}",
        format!("✓ Documentation built in {:.2}s", start.elapsed().as_secs_f64()).green()
    );

    if !open {
        println!();
        println!("   {}", "Open target/doc/playback/index.html in your browser".dimmed());
        println!(
            "   {}",
            "Firmware docs: target/thumbv7em-none-eabihf/doc/firmware/index.html".dimmed()
        );
    }

    println!();

    Ok(())
}

fn build(mut cmd: Command, what: &str) -> Result<()> {
    println!("{}", format!("  Documenting {what} crates...").cyan());
    let output = cmd
        .output()
        .with_context(|| format!("Failed to build {what} documentation"))?;

    if !output.status.success() {
        eprintln!("{}", format!("✗ {what} documentation build failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("Documentation build failed");
    }
    Ok(())
}

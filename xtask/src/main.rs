// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod flash;

use std::process::{Command, Output};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "EL panel scan-out development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the firmware and run it on an RP2040 via probe-rs
    Flash {
        /// Build and flash release version
        #[arg(short, long)]
        release: bool,
        /// Debug probe to use when several are attached
        #[arg(long, default_value_t = 0)]
        probe_index: u32,
    },
    /// Check the RP2040 build, the host build and the no_std crates
    Check,
    /// Run host tests (unit, integration and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
}

/// Run a cargo (or other) command to completion, timing it.
///
/// Prints `label` first; on failure prints stderr and returns an error unless
/// `soft` is set, in which case a warning is printed and `Ok(None)` returned.
pub(crate) fn step(label: &str, cmd: &mut Command, soft: bool) -> Result<Option<Output>> {
    println!("{}", format!("  {label}...").cyan());
    let start = Instant::now();
    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {:?}", cmd.get_program()))?;

    if !output.status.success() {
        if soft {
            eprintln!("{}", format!("  ⚠ {label}: issues found").yellow().bold());
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            println!();
            return Ok(None);
        }
        eprintln!("{}", format!("  ✗ {label} failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        eprintln!("{}", String::from_utf8_lossy(&output.stdout));
        anyhow::bail!("{label} failed");
    }

    println!(
        "{}",
        format!("  ✓ {label} passed in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    println!();
    Ok(Some(output))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Flash {
            release,
            probe_index,
        } => flash::run(release, probe_index),
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
    }
}

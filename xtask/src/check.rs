use anyhow::Result;
use colored::Colorize;
use platform::config::TARGET_TRIPLE;
use std::process::Command;
use std::time::Instant;

use crate::step;

fn cargo(args: &[&str]) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(args);
    cmd
}

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking builds...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: firmware binary for the RP2040
    step(
        "Hardware target (RP2040)",
        &mut cargo(&["check", "-p", "firmware", "--target", TARGET_TRIPLE, "--features", "hardware"]),
        false,
    )?;

    // Check 2: host build with tracing, as used by the tests
    step(
        "Host build (std + tracing)",
        &mut cargo(&["check", "-p", "firmware", "--features", "std,tracing"]),
        false,
    )?;

    // Check 3: conversion core and platform without std
    step(
        "scan-out core and platform (no_std)",
        &mut cargo(&[
            "check",
            "-p",
            "scanout",
            "-p",
            "platform",
            "--target",
            TARGET_TRIPLE,
            "--no-default-features",
            "--features",
            "scanout/defmt",
        ]),
        false,
    )?;

    // Check 4: clippy, reported but not fatal
    step(
        "Clippy",
        &mut cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]),
        true,
    )?;

    // Check 5: formatting, reported but not fatal
    if step("Formatting", &mut cargo(&["fmt", "--all", "--check"]), true)?.is_none() {
        eprintln!("     Run 'cargo fmt --all' to fix");
    }

    println!(
        "{}",
        format!("✓ All checks completed in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();

    Ok(())
}

use anyhow::Result;
use colored::Colorize;
use platform::config::{APP_NAME, TARGET_CHIP, TARGET_TRIPLE};
use std::process::Command;

use crate::step;

fn binary_path(release: bool) -> String {
    let profile = if release { "release" } else { "debug" };
    format!("target/{TARGET_TRIPLE}/{profile}/firmware")
}

pub fn run(release: bool, probe_index: u32) -> Result<()> {
    let mode = if release { "release" } else { "debug" };

    println!();
    println!("{}", format!("🔨 Building firmware ({mode} mode)...").cyan().bold());
    println!();

    let mut build = Command::new("cargo");
    build.args(["build", "-p", "firmware", "--target", TARGET_TRIPLE, "--features", "hardware"]);
    if release {
        build.arg("--release");
    }
    step("Build", &mut build, false)?;

    show_binary_size(release);

    // probe-rs run flashes, resets and then streams the defmt RTT log until
    // interrupted.
    println!("{}", format!("📡 Flashing to {TARGET_CHIP}...").cyan().bold());
    println!("   {}", "Connecting to probe...".dimmed());
    println!("   {}", format!("{APP_NAME} log follows; Ctrl-C to detach").dimmed());
    println!();

    let status = Command::new("probe-rs")
        .arg("run")
        .arg("--chip")
        .arg(TARGET_CHIP)
        .arg("--probe-index")
        .arg(probe_index.to_string())
        .arg(binary_path(release))
        .status();

    match status {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => anyhow::bail!("Flash failed - check that the probe is connected and the board is powered"),
        Err(e) => anyhow::bail!(
            "Failed to run probe-rs ({e}). Is probe-rs installed? (cargo install probe-rs-tools)"
        ),
    }
}

fn show_binary_size(release: bool) {
    let output = Command::new("rust-size").arg(binary_path(release)).arg("-A").output();

    if let Ok(out) = output {
        if out.status.success() {
            println!("{}", "📊 Binary size:".cyan());
            for line in String::from_utf8_lossy(&out.stdout).lines() {
                println!("   {}", line.dimmed());
            }
            println!();
        }
    }
}

//! Application configuration and constants
//!
//! Central values shared by the firmware binary, the scan-out core and the
//! tooling. Reference these rather than hardcoding values.

/// The application name
pub const APP_NAME: &str = "EL Scanout";

/// Application version (synchronized with Cargo.toml)
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Target chip, as understood by probe-rs
pub const TARGET_CHIP: &str = "RP2040";

/// Rust target triple for hardware builds
pub const TARGET_TRIPLE: &str = "thumbv6m-none-eabi";

/// Frames the producer may have submitted but the panel driver not yet
/// accepted (double buffering).
pub const FRAMES_IN_FLIGHT: usize = 2;

/// Number of shared 16-entry palettes derived from system patches.
pub const NUM_SHARED_PALETTES: usize = 3;

/// Maximum overlay placements in one overlay list.
pub const MAX_OVERLAYS: usize = 127;

/// Producer frame cadence used by the demo producer (Hz).
pub const PRODUCER_FRAME_HZ: u64 = 35;

/// Boot banner
pub const fn boot_banner() -> &'static str {
    "EL Scanout - panel driver"
}

//! EL Panel Scan-out Firmware
//!
//! Drives a 320×256 monochrome electroluminescent panel from an RP2040: core 0
//! produces indexed frames, core 1 converts them to dithered 1 bpp images and
//! streams them out through PIO0 and DMA.
//!
//! # Architecture
//!
//! This firmware follows a layered architecture:
//!
//! ```text
//! Application Layer (main.rs, producer)
//!         ↓
//! Panel driver + refresh task (display module)
//!         ↓
//! Scan-out core (scanout crate)
//!         ↓
//! Platform HAL (Embassy, RP2040 PIO + DMA)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for the RP2040 target (embassy-rp, PIO, defmt)
//! - `std` - Enable standard library (for testing)
//! - `tracing` - Log through `tracing` on the host
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv6m-none-eabi --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_self)]
#![allow(clippy::unused_async)]

pub mod boot;
pub mod display;
#[cfg(feature = "hardware")]
pub mod exception_handlers;
pub mod producer;
pub mod resources;
pub mod shared;

// Re-export key types
pub use boot::{BootError, CoreLaunch, BOOT_SEQUENCE_STEPS};
pub use display::{DriverError, PanelDriver};
pub use producer::DemoProducer;
pub use resources::BuiltinResources;
pub use shared::SharedFrameBanks;

#[cfg(feature = "hardware")]
pub use display::PioPanelLink;

//! Hardware Abstraction Layer (HAL) for the EL panel scan-out firmware
//!
//! This crate provides the fixed panel geometry and the trait seams between
//! the scan-out core and the RP2040 peripherals, enabling development and
//! testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: refresh task, boot, RP2040 link)
//!         ↓
//! Scan-out core (scanout crate: palette, dither, patches, overlays, wipe)
//!         ↓
//! Platform HAL (this crate - geometry + trait abstractions)
//!         ↓
//! Hardware Layer (embassy-rp PIO + DMA)
//! ```
//!
//! # Features
//!
//! - `std`: Enable standard library support (mocks for testing)
//! - `defmt`: Enable defmt formatting on platform types
//!
//! # Example
//!
//! ```no_run
//! use platform::{PanelLink, PANEL_HEADER};
//!
//! async fn example<L: PanelLink>(link: &mut L, frame: &[u32]) {
//!     link.send_header(PANEL_HEADER).await.ok();
//!     link.stream_frame(frame).await.ok();
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)] // register and pin names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-core executors, Send bounds not needed

#[cfg(feature = "std")]
extern crate std;

pub mod config;
pub mod display;
pub mod dma;
pub mod mocks;
pub mod panel;

pub use display::{LinkError, PanelLink};
pub use dma::{DataRequest, DmaWords, StreamConfig, TransferSize};
pub use panel::{
    panel_row, FRAME_BANK_BYTES, MAIN_VIEWHEIGHT, PANEL_BUFFER_BYTES, PANEL_BUFFER_WORDS,
    PANEL_HEADER, PANEL_HEIGHT, PANEL_ROWS, PANEL_STRIDE, PANEL_WIDTH, PANEL_Y_OFFSET,
    SCREENHEIGHT, SCREENWIDTH, STATUS_BAR_SOURCE_SHIFT,
};

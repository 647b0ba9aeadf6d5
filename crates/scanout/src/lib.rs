//! Scan-out core for the EL panel
//!
//! Turns the producer's 8-bit indexed frames into the packed 1 bpp buffer the
//! panel is refreshed from: palette to brightness reduction, ordered
//! dithering, sprite overlays decoded straight from their compressed rows,
//! the screen melt and the frame hand-off between the two cores.
//!
//! Everything here is hardware independent; the firmware crate supplies the
//! PIO link and the executors.
//!
//! # Per panel frame
//!
//! ```text
//! FrameHandoff ──▶ DisplayContext::begin_frame   (take frame, palette, wipe)
//!                        │
//!                        ▼
//!                  DisplayContext::render         (200 scanlines)
//!                  ├─ convert_single / convert_wipe
//!                  └─ overlays: scheduler ▶ blit_row ▶ tile_row
//!                        │
//!                        ▼
//!                  PanelBuffer ──▶ PanelLink (header + DMA burst)
//! ```
//!
//! # Features
//!
//! - `std`: host builds (enables the platform mocks)
//! - `defmt`: log through defmt
//! - `tracing`: log through tracing

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
#![deny(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::new_without_default)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod context;
pub mod dither;
pub mod frame;
pub mod handoff;
pub mod overlay;
pub mod palette;
pub mod patch;
pub mod resources;
pub mod scanline;
pub mod wipe;

pub use context::DisplayContext;
pub use dither::DitherMap;
pub use frame::{Bank, FrameBanks, PanelBuffer, VideoMode, FRAME_BYTES};
pub use handoff::{FrameDescriptor, FrameHandoff, HandoffError};
pub use overlay::{OverlayEntry, OverlayList, OverlayScheduler, Visit};
pub use palette::{Contrast, PaletteSource, PaletteTables};
pub use patch::{Patch, PatchEncoding, PatchHandle, Texel};
pub use resources::DisplayResources;
pub use wipe::{WipeStart, WipeState, WIPE_END};

//! Panel and frame geometry for the EL320.256 electroluminescent panel.
//!
//! ## Frame vs. panel coordinates
//!
//! | Space         | Width | Height | Notes |
//! |---------------|-------|--------|-------|
//! | Indexed frame | 320   | 168    | one bank of the producer's 8-bit frame |
//! | Game screen   | 320   | 200    | view (168 rows) + status bar (32 rows) |
//! | Panel         | 320   | 256    | 1 bpp, game screen centred at row 28 |
//!
//! The panel buffer carries one spare row (`PANEL_ROWS = 257`) so the DMA
//! burst length is a whole number of words after the header word.
//!
//! ## Usage
//! ```rust
//! use platform::panel::{panel_row, PANEL_HEADER, PANEL_STRIDE};
//!
//! assert_eq!(panel_row(0), 28);
//! assert_eq!(PANEL_STRIDE, 40);
//! assert_eq!(PANEL_HEADER, (256 << 16) | 319);
//! ```

// ── Game screen ─────────────────────────────────────────────────────────────

/// Width of the producer's indexed frame, in pixels.
pub const SCREENWIDTH: usize = 320;

/// Height of the full game screen (3D view + status bar), in rows.
pub const SCREENHEIGHT: usize = 200;

/// Height of one indexed frame bank (the 3D view), in rows.
pub const MAIN_VIEWHEIGHT: usize = 168;

/// Vertical shift applied when rows below the view are sourced from the
/// other bank: screen row `r >= MAIN_VIEWHEIGHT` reads bank row `r - 32`.
pub const STATUS_BAR_SOURCE_SHIFT: usize = 32;

/// Bytes in one indexed frame bank.
pub const FRAME_BANK_BYTES: usize = SCREENWIDTH * MAIN_VIEWHEIGHT;

// ── Panel ───────────────────────────────────────────────────────────────────

/// Panel width in pixels.
pub const PANEL_WIDTH: usize = 320;

/// Visible panel height in rows.
pub const PANEL_HEIGHT: usize = 256;

/// Rows held by the panel buffer (visible rows + one spare).
pub const PANEL_ROWS: usize = PANEL_HEIGHT + 1;

/// Bytes per packed 1 bpp panel row.
pub const PANEL_STRIDE: usize = PANEL_WIDTH / 8;

/// Total panel buffer size in bytes.
///
/// 40 bytes/row × 257 rows = 10 280 bytes = 2 570 DMA words.
pub const PANEL_BUFFER_BYTES: usize = PANEL_STRIDE * PANEL_ROWS;

/// Number of 32-bit DMA transfers per physical frame.
pub const PANEL_BUFFER_WORDS: usize = PANEL_BUFFER_BYTES / 4;

/// First panel row used by game screen row 0 (vertical centring).
pub const PANEL_Y_OFFSET: usize = 28;

/// Geometry header word sent ahead of every frame burst.
///
/// Encoding: `(rows - 1) << 16 | (width - 1)`, consumed by the timing program
/// to load its row and pixel counters.
// PANEL_ROWS = 257 and PANEL_WIDTH = 320: both fit in 16 bits, no truncation.
#[allow(clippy::cast_possible_truncation)]
pub const PANEL_HEADER: u32 = (((PANEL_ROWS - 1) as u32) << 16) | ((PANEL_WIDTH - 1) as u32);

/// Map a game screen row to its panel row.
#[must_use]
#[allow(clippy::arithmetic_side_effects)] // Safety: callers pass rows < SCREENHEIGHT; 199 + 28 < usize::MAX
pub const fn panel_row(scanline: usize) -> usize {
    scanline + PANEL_Y_OFFSET
}

// ── Pins ────────────────────────────────────────────────────────────────────

/// Vertical sync output (GPIO16).
pub const EL_VS_PIN: u8 = 16;

/// Horizontal sync output (GPIO17).
pub const EL_HS_PIN: u8 = 17;

/// Pixel clock output (GPIO18).
pub const EL_VCLK_PIN: u8 = 18;

/// Serial pixel data output (GPIO19).
pub const EL_VID_PIN: u8 = 19;

/// Diagnostic pin toggled on entry to every refresh cycle (GPIO14).
pub const DEBUG_REFRESH_PIN: u8 = 14;

/// Diagnostic pin toggled when the DMA burst completes (GPIO15).
pub const DEBUG_COMPLETE_PIN: u8 = 15;

// Compile-time layout checks.
const _: () = assert!(PANEL_WIDTH % 8 == 0);
const _: () = assert!(PANEL_BUFFER_BYTES % 4 == 0);
const _: () = assert!(SCREENHEIGHT + PANEL_Y_OFFSET <= PANEL_HEIGHT);
const _: () = assert!(SCREENHEIGHT - STATUS_BAR_SOURCE_SHIFT <= MAIN_VIEWHEIGHT);

//! Built-in assets for running the panel without a game attached.
//!
//! A single grey-ramp palette (index `i` is `(i, i, i)`), four gamma levels,
//! a handful of patches covering every row encoding and two overlay lists.
//! Because the palette lump holds one palette, every non-zero palette
//! request is served by the synthesized flash path.

use scanout::overlay::OverlayEntry;
use scanout::palette::PALETTE_BYTES;
use scanout::patch::RUN_END;
use scanout::{DisplayResources, Patch, PatchEncoding, PatchHandle};

// ---------------------------------------------------------------------------
// Palette and gamma
// ---------------------------------------------------------------------------

/// Grey ramp palette lump.
#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing, clippy::arithmetic_side_effects)] // const loop, i < 768
pub static PLAYPAL: [u8; PALETTE_BYTES] = {
    let mut lump = [0u8; PALETTE_BYTES];
    let mut i = 0;
    while i < PALETTE_BYTES {
        lump[i] = (i / 3) as u8;
        i += 1;
    }
    lump
};

/// Gamma levels above 0.
pub const GAMMA_LEVELS: usize = 4;

/// Gamma level `n` lifts channel `c` by `(255 - c) * n / 8`.
#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing, clippy::arithmetic_side_effects)] // const loop, result <= 255
static GAMMA: [[u8; 256]; GAMMA_LEVELS] = {
    let mut tables = [[0u8; 256]; GAMMA_LEVELS];
    let mut t = 0;
    while t < GAMMA_LEVELS {
        let mut c = 0;
        while c < 256 {
            tables[t][c] = (c + (255 - c) * (t + 1) / 8) as u8;
            c += 1;
        }
        t += 1;
    }
    tables
};

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Status bar top rule (border rectangle).
pub const STATUS_RULE: PatchHandle = PatchHandle(1);
/// Seeds shared table 0 and 2: dark to light.
pub const RAMP_UP: PatchHandle = PatchHandle(2);
/// Seeds shared table 1: light to dark.
pub const RAMP_DOWN: PatchHandle = PatchHandle(3);
/// 8×8 diamond drawn through shared table 0.
pub const DIAMOND: PatchHandle = PatchHandle(4);
/// 6×4 key card, 8-bit runs.
pub const KEY: PatchHandle = PatchHandle(5);
/// 12×2 ammo tick, 4-bit runs. Tiled with a 1 column correction.
pub const TICK: PatchHandle = PatchHandle(6);
/// 5×3 crosshair, 6-bit runs.
pub const CROSSHAIR: PatchHandle = PatchHandle(7);

const RULE_ROWS: [u8; 4] = [255, 128, 255, 128];

const RAMP_UP_PALETTE: [u8; 16] = [0, 17, 34, 51, 68, 85, 102, 119, 136, 153, 170, 187, 204, 221, 238, 255];
const RAMP_DOWN_PALETTE: [u8; 16] = [255, 238, 221, 204, 187, 170, 153, 136, 119, 102, 85, 68, 51, 34, 17, 0];
const RAMP_ROWS: [u8; 8] = [0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE];

#[rustfmt::skip]
const DIAMOND_ROWS: [u8; 32] = [
    0x00, 0xF0, 0x0F, 0x00,
    0x00, 0xFF, 0xFF, 0x00,
    0xF0, 0xFF, 0xFF, 0x0F,
    0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF,
    0xF0, 0xFF, 0xFF, 0x0F,
    0x00, 0xFF, 0xFF, 0x00,
    0x00, 0xF0, 0x0F, 0x00,
];

const KEY_PALETTE: [u8; 3] = [0, 200, 255];
#[rustfmt::skip]
const KEY_ROWS: [u8; 30] = [
    1, 4, 1, 2, 2, 1, RUN_END,
    0, 6, 2, 2, 2, 2, 2, 2,
    0, 6, 2, 1, 1, 1, 1, 2,
    1, 4, 1, 2, 2, 1, RUN_END,
];

const TICK_PALETTE: [u8; 2] = [0, 160];
#[rustfmt::skip]
const TICK_ROWS: [u8; 14] = [
    2, 8, 0x11, 0x11, 0x11, 0x11, RUN_END,
    2, 8, 0x11, 0x11, 0x11, 0x11, RUN_END,
];

const CROSSHAIR_PALETTE: [u8; 2] = [0, 255];
#[rustfmt::skip]
const CROSSHAIR_ROWS: [u8; 14] = [
    2, 1, 0x01, RUN_END,
    // Four 6-bit 1s packed into three bytes, then one trailing pixel.
    0, 5, 0x41, 0x10, 0x04, 0x01,
    2, 1, 0x01, RUN_END,
];

// ---------------------------------------------------------------------------
// Overlay lists
// ---------------------------------------------------------------------------

/// Overlay list shown with the status bar.
pub const HUD_OVERLAYS: u8 = 1;
/// Overlay list with only the crosshair.
pub const CROSSHAIR_OVERLAYS: u8 = 2;

const fn entry(x: u16, y: u8, repeat: u8, patch: PatchHandle) -> OverlayEntry {
    OverlayEntry { x, y, repeat, patch }
}

static HUD: [OverlayEntry; 5] = [
    entry(158, 82, 0, CROSSHAIR),
    entry(0, 168, 0, STATUS_RULE),
    entry(300, 174, 0, KEY),
    entry(8, 180, 5, TICK),
    entry(140, 178, 0, DIAMOND),
];

static CROSSHAIR_ONLY: [OverlayEntry; 1] = [entry(158, 82, 0, CROSSHAIR)];

/// Columns dropped from a tick when it is tiled.
pub const TICK_TILE_CORRECTION: u16 = 1;

// ---------------------------------------------------------------------------
// Resource table
// ---------------------------------------------------------------------------

/// [`DisplayResources`] backed by the built-in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuiltinResources {
    gamma_level: u8,
}

impl BuiltinResources {
    /// No gamma correction.
    pub const fn new() -> Self {
        Self { gamma_level: 0 }
    }

    /// Use gamma level `level`, clamped to the available tables.
    #[allow(clippy::cast_possible_truncation)] // GAMMA_LEVELS = 4
    pub const fn with_gamma(level: u8) -> Self {
        let max = GAMMA_LEVELS as u8;
        Self {
            gamma_level: if level > max { max } else { level },
        }
    }
}

impl DisplayResources for BuiltinResources {
    fn patch(&self, handle: PatchHandle) -> Option<Patch<'_>> {
        let patch = match handle {
            STATUS_RULE => Patch {
                width: 320,
                height: 2,
                encoding: PatchEncoding::Border,
                palette: &[],
                shared_palette: None,
                color_count: 0,
                data: &RULE_ROWS,
            },
            RAMP_UP => Patch {
                width: 16,
                height: 1,
                encoding: PatchEncoding::Solid4,
                palette: &RAMP_UP_PALETTE,
                shared_palette: Some(0),
                color_count: 16,
                data: &RAMP_ROWS,
            },
            RAMP_DOWN => Patch {
                width: 16,
                height: 1,
                encoding: PatchEncoding::Solid4,
                palette: &RAMP_DOWN_PALETTE,
                shared_palette: Some(1),
                color_count: 16,
                data: &RAMP_ROWS,
            },
            DIAMOND => Patch {
                width: 8,
                height: 8,
                encoding: PatchEncoding::Alpha4,
                palette: &[],
                shared_palette: Some(0),
                color_count: 16,
                data: &DIAMOND_ROWS,
            },
            KEY => Patch {
                width: 6,
                height: 4,
                encoding: PatchEncoding::Runs8,
                palette: &KEY_PALETTE,
                shared_palette: None,
                color_count: 3,
                data: &KEY_ROWS,
            },
            TICK => Patch {
                width: 12,
                height: 2,
                encoding: PatchEncoding::Runs4,
                palette: &TICK_PALETTE,
                shared_palette: None,
                color_count: 2,
                data: &TICK_ROWS,
            },
            CROSSHAIR => Patch {
                width: 5,
                height: 3,
                encoding: PatchEncoding::Runs6,
                palette: &CROSSHAIR_PALETTE,
                shared_palette: None,
                color_count: 2,
                data: &CROSSHAIR_ROWS,
            },
            _ => return None,
        };
        Some(patch)
    }

    fn overlays(&self, index: u8) -> &[OverlayEntry] {
        match index {
            HUD_OVERLAYS => &HUD,
            CROSSHAIR_OVERLAYS => &CROSSHAIR_ONLY,
            _ => &[],
        }
    }

    fn playpal(&self) -> &[u8] {
        &PLAYPAL
    }

    fn gamma_level(&self) -> u8 {
        self.gamma_level
    }

    fn gamma_table(&self, table: usize) -> Option<&[u8; 256]> {
        GAMMA.get(table)
    }

    fn shared_palette_source(&self, table: usize) -> Option<PatchHandle> {
        match table {
            0 | 2 => Some(RAMP_UP),
            1 => Some(RAMP_DOWN),
            _ => None,
        }
    }

    fn repeat_width_correction(&self, handle: PatchHandle) -> u16 {
        if handle == TICK {
            TICK_TILE_CORRECTION
        } else {
            0
        }
    }
}

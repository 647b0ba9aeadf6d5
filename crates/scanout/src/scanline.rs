//! Per-scanline conversion of indexed pixels to dithered panel pixels.

use platform::{panel_row, SCREENWIDTH};

use crate::dither::DitherMap;
use crate::frame::{Bank, FrameBanks, PanelBuffer};
use crate::palette::PaletteTables;
use crate::wipe::WipeState;

/// Threshold map for the base conversion of a frame shown from `bank`.
///
/// Alternating maps between banks spreads the dither pattern over time.
pub const fn base_map(bank: Bank) -> DitherMap {
    match bank {
        Bank::Zero => DitherMap::Bayer8,
        Bank::One => DitherMap::Bayer4,
    }
}

/// Threshold map for overlays drawn over a frame shown from `bank`.
pub const fn overlay_map(bank: Bank) -> DitherMap {
    match bank {
        Bank::Zero => DitherMap::Bayer8,
        Bank::One => DitherMap::Bayer8Transposed,
    }
}

/// Threshold map used while a melt is running.
pub const WIPE_MAP: DitherMap = DitherMap::Bayer8;

#[inline]
fn convert_row<I>(panel: &mut PanelBuffer, row: usize, pixels: I, tables: &PaletteTables, map: DitherMap)
where
    I: Iterator<Item = u8>,
{
    for (x, index) in pixels.enumerate() {
        let value = tables.brightness(index);
        panel.put(x, row, map.lit(value, x, row));
    }
}

/// Convert game screen row `scanline` of the frame shown from `bank`.
///
/// With `scroll` the row is shifted right by one pixel and the scroll value
/// enters on the left. The frame banks are never modified.
pub fn convert_single(
    panel: &mut PanelBuffer,
    frames: &FrameBanks,
    tables: &PaletteTables,
    bank: Bank,
    scanline: usize,
    scroll: Option<u8>,
) {
    let Some(src) = frames.source_row(bank, scanline) else {
        return;
    };
    let row = panel_row(scanline);
    let map = base_map(bank);
    let pixels = src.iter().copied();
    match scroll {
        None => convert_row(panel, row, pixels, tables, map),
        Some(left) => {
            let shifted = core::iter::once(left).chain(pixels.take(SCREENWIDTH.saturating_sub(1)));
            convert_row(panel, row, shifted, tables, map);
        }
    }
}

/// Convert game screen row `scanline` while a melt is running.
///
/// Above a column's live offset the new frame (shown from `bank`) shows;
/// below it the old frame row `scanline - offset` is read through the wipe
/// line lookup. Lookups that fall outside the frame memory leave the pixel
/// untouched.
pub fn convert_wipe(
    panel: &mut PanelBuffer,
    frames: &FrameBanks,
    tables: &PaletteTables,
    bank: Bank,
    scanline: usize,
    wipe: &WipeState,
) {
    let Some(new_row) = frames.source_row(bank, scanline) else {
        return;
    };
    let row = panel_row(scanline);
    let mut skipped = 0u32;
    for (x, &new_index) in new_row.iter().enumerate() {
        let index = match scanline.checked_sub(usize::from(wipe.offset(x))) {
            None => Some(new_index),
            Some(rel) => wipe
                .line_offset(rel)
                .and_then(|off| frames.line_at(off))
                .and_then(|line| line.get(x))
                .copied(),
        };
        match index {
            Some(index) => {
                let value = tables.brightness(index);
                panel.put(x, row, WIPE_MAP.lit(value, x, row));
            }
            None => skipped = skipped.saturating_add(1),
        }
    }
    if skipped > 0 {
        trace!("wipe row {}: {} pixels without a valid line", scanline, skipped);
    }
}

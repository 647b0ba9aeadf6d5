//! Compressed sprite ("patch") row decoder.
//!
//! A patch is stored row after row; decoding one row consumes a prefix of
//! the remaining stream and returns the offset where the next row starts, so
//! an overlay is decoded strictly sequentially while the panel is built top
//! to bottom.
//!
//! # Row encodings
//!
//! | Encoding | Row layout |
//! |----------|------------|
//! | `Runs4`  | `gap len nibbles…` runs; `0xFF` gap or a full row ends it |
//! | `Alpha4` | `ceil(w/2)` bytes of nibble pairs, nibble 0 transparent |
//! | `Solid4` | `ceil(w/2)` bytes of nibble pairs |
//! | `Runs6`  | `gap len` runs, four 6-bit indices per 3 bytes |
//! | `Runs8`  | `gap len` runs, one byte per index |
//! | `Border` | left colour byte, fill byte (both global palette indices) |
//!
//! Nibbles are low first: the low nibble is the left pixel.

use platform::config::NUM_SHARED_PALETTES;

use crate::dither::DitherMap;
use crate::frame::PanelBuffer;
use crate::palette::{Contrast, PaletteTables};

/// Gap byte that ends a run-encoded row early.
pub const RUN_END: u8 = 0xFF;

/// Opaque reference resolved by the resource layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatchHandle(pub u16);

/// Row encoding of a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PatchEncoding {
    /// 4-bit runs
    Runs4,
    /// 4-bit, nibble 0 transparent
    Alpha4,
    /// 4-bit, every pixel drawn
    Solid4,
    /// 6-bit runs
    Runs6,
    /// 8-bit runs
    Runs8,
    /// Bordered rectangle
    Border,
}

/// A decoded-on-the-fly sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch<'a> {
    /// Width in pixels
    pub width: u16,
    /// Height in rows
    pub height: u16,
    /// Row encoding
    pub encoding: PatchEncoding,
    /// Embedded palette: local index `i` is global palette index
    /// `palette[i]`
    pub palette: &'a [u8],
    /// Shared table the local indices resolve through instead of the
    /// embedded palette. Only `Solid4`/`Alpha4` patches may use one.
    pub shared_palette: Option<u8>,
    /// Number of colours used (at most 16 for shared-palette patches)
    pub color_count: u8,
    /// Encoded rows
    pub data: &'a [u8],
}

/// One decoded pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texel {
    /// Patch-local colour index
    Local(u8),
    /// Global palette index (border rectangles)
    Global(u8),
    /// Nothing drawn
    Transparent,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    #[inline]
    fn next(&mut self) -> Option<u8> {
        let b = self.data.get(self.pos).copied()?;
        self.pos = self.pos.saturating_add(1);
        Some(b)
    }
}

/// Decode one row of `patch` starting at byte `offset`, placing its left
/// edge at column `x`. Every decoded pixel is passed to `emit` with its
/// column. Returns the offset of the next row.
///
/// A stream that ends early ends the row.
pub fn decode_row<E>(patch: &Patch<'_>, offset: usize, x: usize, mut emit: E) -> usize
where
    E: FnMut(usize, Texel),
{
    let mut cur = Cursor::new(patch.data, offset);
    let width = usize::from(patch.width);
    match patch.encoding {
        PatchEncoding::Runs4 => decode_runs(&mut cur, x, width, &mut emit, run4::<E>),
        PatchEncoding::Runs6 => decode_runs(&mut cur, x, width, &mut emit, run6::<E>),
        PatchEncoding::Runs8 => decode_runs(&mut cur, x, width, &mut emit, run8::<E>),
        PatchEncoding::Alpha4 => decode_nibbles(&mut cur, x, width, true, &mut emit),
        PatchEncoding::Solid4 => decode_nibbles(&mut cur, x, width, false, &mut emit),
        PatchEncoding::Border => decode_border(&mut cur, x, width, &mut emit),
    }
    cur.pos
}

type RunFn<E> = fn(&mut Cursor<'_>, usize, usize, &mut E) -> Option<usize>;

fn decode_runs<E>(cur: &mut Cursor<'_>, x: usize, width: usize, emit: &mut E, run: RunFn<E>)
where
    E: FnMut(usize, Texel),
{
    let pend = x.saturating_add(width);
    let mut px = x;
    loop {
        let Some(gap) = cur.next() else { break };
        if gap == RUN_END {
            break;
        }
        px = px.saturating_add(usize::from(gap));
        let Some(len) = cur.next() else { break };
        let Some(end) = run(cur, usize::from(len), px, emit) else {
            break;
        };
        px = end;
        debug_assert!(px <= pend, "run overflows patch row");
        if px >= pend {
            break;
        }
    }
}

#[allow(clippy::arithmetic_side_effects)] // Safety: px < panel width + 255 per run
fn run4<E: FnMut(usize, Texel)>(cur: &mut Cursor<'_>, len: usize, mut px: usize, emit: &mut E) -> Option<usize> {
    for _ in 0..len / 2 {
        let v = cur.next()?;
        emit(px, Texel::Local(v & 0x0F));
        emit(px + 1, Texel::Local(v >> 4));
        px += 2;
    }
    if len & 1 != 0 {
        let v = cur.next()?;
        emit(px, Texel::Local(v & 0x0F));
        px += 1;
    }
    Some(px)
}

#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)] // Safety: masked to 6 bits before the cast
fn run6<E: FnMut(usize, Texel)>(cur: &mut Cursor<'_>, len: usize, mut px: usize, emit: &mut E) -> Option<usize> {
    for _ in 0..len / 4 {
        let v = u32::from(cur.next()?) | u32::from(cur.next()?) << 8 | u32::from(cur.next()?) << 16;
        for shift in [0, 6, 12, 18] {
            emit(px, Texel::Local(((v >> shift) & 0x3F) as u8));
            px += 1;
        }
    }
    // Trailing pixels take one byte each and continue the same bit stream.
    let rest = len & 3;
    if rest > 0 {
        let mut v = u32::from(cur.next()?);
        emit(px, Texel::Local((v & 0x3F) as u8));
        px += 1;
        if rest > 1 {
            v = (v >> 6) | u32::from(cur.next()?) << 2;
            emit(px, Texel::Local((v & 0x3F) as u8));
            px += 1;
            if rest > 2 {
                v = (v >> 6) | u32::from(cur.next()?) << 4;
                emit(px, Texel::Local((v & 0x3F) as u8));
                px += 1;
            }
        }
    }
    Some(px)
}

#[allow(clippy::arithmetic_side_effects)] // Safety: px < panel width + 255 per run
fn run8<E: FnMut(usize, Texel)>(cur: &mut Cursor<'_>, len: usize, mut px: usize, emit: &mut E) -> Option<usize> {
    for _ in 0..len {
        emit(px, Texel::Local(cur.next()?));
        px += 1;
    }
    Some(px)
}

#[allow(clippy::arithmetic_side_effects)] // Safety: x + width fits usize for u16 widths
fn decode_nibbles<E>(cur: &mut Cursor<'_>, x: usize, width: usize, alpha: bool, emit: &mut E)
where
    E: FnMut(usize, Texel),
{
    let texel = |n: u8| {
        if alpha && n == 0 {
            Texel::Transparent
        } else {
            Texel::Local(n)
        }
    };
    let mut px = x;
    for _ in 0..width / 2 {
        let Some(v) = cur.next() else { return };
        emit(px, texel(v & 0x0F));
        emit(px + 1, texel(v >> 4));
        px += 2;
    }
    if width & 1 != 0 {
        let Some(v) = cur.next() else { return };
        emit(px, texel(v & 0x0F));
    }
}

#[allow(clippy::arithmetic_side_effects)] // Safety: x + width fits usize for u16 widths
fn decode_border<E>(cur: &mut Cursor<'_>, x: usize, width: usize, emit: &mut E)
where
    E: FnMut(usize, Texel),
{
    let Some(left) = cur.next() else { return };
    let Some(fill) = cur.next() else { return };
    emit(x, Texel::Global(left));
    for i in 1..width.saturating_sub(1) {
        emit(x + i, Texel::Global(fill));
    }
    if width > 0 {
        emit(x + width - 1, Texel::Global(fill));
    }
}

/// Brightness of a texel of `patch`, before the overlay contrast push.
#[inline]
pub fn texel_brightness(patch: &Patch<'_>, tables: &PaletteTables, texel: Texel) -> Option<u8> {
    match texel {
        Texel::Transparent => None,
        Texel::Global(i) => Some(tables.brightness(i)),
        Texel::Local(i) => match patch.shared_palette {
            Some(table) => {
                debug_assert!(usize::from(table) < NUM_SHARED_PALETTES, "shared palette index out of range");
                tables.shared(usize::from(table), i)
            }
            None => patch.palette.get(usize::from(i)).map(|&g| tables.brightness(g)),
        },
    }
}

/// Decode one row of `patch` straight into `panel` row `row`, thresholding
/// every pixel through `map` after the overlay contrast push.
///
/// Shared-palette patches must be `Solid4` or `Alpha4`; any other
/// combination draws nothing and consumes nothing.
pub fn blit_row(
    panel: &mut PanelBuffer,
    tables: &PaletteTables,
    patch: &Patch<'_>,
    offset: usize,
    x: usize,
    row: usize,
    map: DitherMap,
) -> usize {
    if patch.shared_palette.is_some() {
        let supported = matches!(patch.encoding, PatchEncoding::Solid4 | PatchEncoding::Alpha4);
        debug_assert!(supported, "shared palette on a non-4-bit patch");
        if !supported {
            return offset;
        }
    }
    decode_row(patch, offset, x, |px, texel| {
        if let Some(value) = texel_brightness(patch, tables, texel) {
            let value = Contrast::OVERLAY.apply(i32::from(value));
            panel.put(px, row, map.lit(value, px, row));
        }
    })
}

/// Replicate the already drawn span `[x, x + tile)` of `row` `repeat` more
/// times to its right.
pub fn tile_row(panel: &mut PanelBuffer, row: usize, x: usize, tile: usize, repeat: u8) {
    if tile == 0 {
        return;
    }
    for k in 1..=usize::from(repeat) {
        let dst = x.saturating_add(tile.saturating_mul(k));
        panel.copy_span(row, x, dst, tile);
    }
}

//! Frame memory: the producer's two indexed banks and the packed 1 bpp panel
//! buffer the refresh cycle rebuilds.

use platform::{
    DmaWords, FRAME_BANK_BYTES, MAIN_VIEWHEIGHT, PANEL_BUFFER_WORDS, PANEL_ROWS, PANEL_STRIDE,
    PANEL_WIDTH, SCREENHEIGHT, SCREENWIDTH, STATUS_BAR_SOURCE_SHIFT,
};

// ---------------------------------------------------------------------------
// Bank / mode selectors
// ---------------------------------------------------------------------------

/// One of the two indexed frame banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// Bank 0
    #[default]
    Zero,
    /// Bank 1
    One,
}

impl Bank {
    /// Bank for index `i`; only the low bit is used.
    pub const fn from_index(i: u8) -> Self {
        if i & 1 == 0 {
            Self::Zero
        } else {
            Self::One
        }
    }

    /// Numeric index (0 or 1).
    pub const fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }

    /// The other bank.
    pub const fn other(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }
}

/// How the refresh cycle turns the displayed frame into panel pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VideoMode {
    /// Leave the panel buffer untouched.
    #[default]
    None,
    /// Text console. Not rendered; treated like [`VideoMode::None`].
    Text,
    /// Save screen: base conversion only, no per-frame setup work.
    Saving,
    /// Palette-expanded output. Rendered like [`VideoMode::Single`].
    Double,
    /// Regular game frame.
    Single,
    /// Screen melt between the old and new frames.
    Wipe,
}

impl VideoMode {
    /// Modes that composite overlays after the base conversion.
    pub const fn has_overlays(self) -> bool {
        matches!(self, Self::Double | Self::Single | Self::Wipe)
    }

    /// Modes that run overlay rebuild, palette recompute and wipe advance
    /// during frame setup.
    pub const fn runs_frame_setup(self) -> bool {
        self.has_overlays()
    }
}

// ---------------------------------------------------------------------------
// Indexed frame banks
// ---------------------------------------------------------------------------

/// Total bytes of both banks.
pub const FRAME_BYTES: usize = 2 * FRAME_BANK_BYTES;

/// The producer's two `SCREENWIDTH × MAIN_VIEWHEIGHT` 8-bit banks, stored
/// back to back so a single byte offset addresses either bank.
#[repr(C, align(4))]
pub struct FrameBanks {
    bytes: [u8; FRAME_BYTES],
}

impl FrameBanks {
    /// Both banks filled with palette index 0.
    pub const fn new() -> Self {
        Self {
            bytes: [0; FRAME_BYTES],
        }
    }

    /// Byte offset of `row` of `bank` within the combined memory.
    #[allow(clippy::arithmetic_side_effects)] // Safety: bank <= 1 and rows are small; no overflow in usize
    pub const fn line_offset(bank: Bank, row: usize) -> usize {
        bank.index() * FRAME_BANK_BYTES + row * SCREENWIDTH
    }

    /// Read-only view of one bank.
    pub fn bank(&self, bank: Bank) -> &[u8] {
        let start = Self::line_offset(bank, 0);
        self.bytes
            .get(start..start.saturating_add(FRAME_BANK_BYTES))
            .unwrap_or(&[])
    }

    /// Mutable view of one bank.
    pub fn bank_mut(&mut self, bank: Bank) -> &mut [u8] {
        let start = Self::line_offset(bank, 0);
        self.bytes
            .get_mut(start..start.saturating_add(FRAME_BANK_BYTES))
            .unwrap_or(&mut [])
    }

    /// Row `row` of `bank`, or `None` past the view height.
    pub fn row(&self, bank: Bank, row: usize) -> Option<&[u8]> {
        if row >= MAIN_VIEWHEIGHT {
            return None;
        }
        self.line_at(Self::line_offset(bank, row))
    }

    /// Mutable row `row` of `bank`.
    pub fn row_mut(&mut self, bank: Bank, row: usize) -> Option<&mut [u8]> {
        if row >= MAIN_VIEWHEIGHT {
            return None;
        }
        let start = Self::line_offset(bank, row);
        self.bytes.get_mut(start..start.saturating_add(SCREENWIDTH))
    }

    /// Source row for game screen row `scanline` when `display` is shown.
    ///
    /// Rows inside the view come from the displayed bank; status bar rows
    /// come from the other bank, shifted up by [`STATUS_BAR_SOURCE_SHIFT`].
    pub fn source_row(&self, display: Bank, scanline: usize) -> Option<&[u8]> {
        if scanline >= SCREENHEIGHT {
            return None;
        }
        if scanline < MAIN_VIEWHEIGHT {
            self.row(display, scanline)
        } else {
            self.row(
                display.other(),
                scanline.saturating_sub(STATUS_BAR_SOURCE_SHIFT),
            )
        }
    }

    /// `SCREENWIDTH` bytes starting at combined byte offset `offset`, or
    /// `None` when the line would leave the frame memory.
    pub fn line_at(&self, offset: usize) -> Option<&[u8]> {
        let end = offset.checked_add(SCREENWIDTH)?;
        self.bytes.get(offset..end)
    }

    /// Both banks as one byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for FrameBanks {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Panel buffer
// ---------------------------------------------------------------------------

/// Packed 1 bpp panel image, `PANEL_WIDTH × PANEL_ROWS`, row-major.
///
/// Stored as words so it can be streamed by DMA without casts. Byte `k` of
/// the packed image is byte `k % 4` of word `k / 4` (little-endian), and
/// within a byte the least significant bit is the leftmost pixel.
#[derive(Clone, PartialEq, Eq)]
#[repr(C, align(4))]
pub struct PanelBuffer {
    words: [u32; PANEL_BUFFER_WORDS],
}

impl PanelBuffer {
    /// All pixels off.
    pub const fn new() -> Self {
        Self {
            words: [0; PANEL_BUFFER_WORDS],
        }
    }

    #[inline]
    #[allow(clippy::arithmetic_side_effects)] // Safety: x < 320 and row < 257 checked first
    fn locate(x: usize, row: usize) -> Option<(usize, u32)> {
        if x >= PANEL_WIDTH || row >= PANEL_ROWS {
            return None;
        }
        let byte = row * PANEL_STRIDE + (x >> 3);
        let bit = (byte & 3) * 8 + (x & 7);
        Some((byte >> 2, 1 << bit))
    }

    /// Light pixel `(x, row)`. Out-of-geometry writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, row: usize) {
        if let Some((w, mask)) = Self::locate(x, row) {
            if let Some(word) = self.words.get_mut(w) {
                *word |= mask;
            }
        }
    }

    /// Darken pixel `(x, row)`. Out-of-geometry writes are ignored.
    #[inline]
    pub fn clear(&mut self, x: usize, row: usize) {
        if let Some((w, mask)) = Self::locate(x, row) {
            if let Some(word) = self.words.get_mut(w) {
                *word &= !mask;
            }
        }
    }

    /// Set or clear pixel `(x, row)`.
    #[inline]
    pub fn put(&mut self, x: usize, row: usize, on: bool) {
        if on {
            self.set(x, row);
        } else {
            self.clear(x, row);
        }
    }

    /// Whether pixel `(x, row)` is lit; `false` outside the geometry.
    pub fn get(&self, x: usize, row: usize) -> bool {
        Self::locate(x, row)
            .and_then(|(w, mask)| self.words.get(w).map(|word| word & mask != 0))
            .unwrap_or(false)
    }

    /// Copy `len` pixels of `row` from column `src_x` to column `dst_x`.
    /// Pixels landing outside the panel are dropped.
    pub fn copy_span(&mut self, row: usize, src_x: usize, dst_x: usize, len: usize) {
        for i in 0..len {
            let on = self.get(src_x.saturating_add(i), row);
            self.put(dst_x.saturating_add(i), row, on);
        }
    }

    /// Turn every pixel off.
    pub fn clear_all(&mut self) {
        self.words.fill(0);
    }

    /// Packed bytes of `row` in memory order.
    #[allow(clippy::arithmetic_side_effects)] // Safety: row < PANEL_ROWS checked; 40-byte rows are word aligned
    pub fn row_bytes(&self, row: usize) -> Option<[u8; PANEL_STRIDE]> {
        if row >= PANEL_ROWS {
            return None;
        }
        let first = row * PANEL_STRIDE / 4;
        let words = self.words.get(first..first + PANEL_STRIDE / 4)?;
        let mut out = [0u8; PANEL_STRIDE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Some(out)
    }

    /// Number of lit pixels in the whole buffer.
    pub fn lit_count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

impl Default for PanelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DmaWords for PanelBuffer {
    fn words(&self) -> &[u32] {
        &self.words
    }
}

const _: () = assert!(PANEL_STRIDE % 4 == 0);

//! Screen melt transition.
//!
//! Every column carries a signed raw accumulator. Columns start at or below
//! zero (a staggered delay), wait while negative, then slide down slowly at
//! first and at a constant speed after 16 rows. The live offset of a column
//! is how far the old frame has slid down in that column; above it the new
//! frame shows through.

use platform::{SCREENHEIGHT, SCREENWIDTH};

/// Offset at which a column has fully revealed the new frame.
#[allow(clippy::cast_possible_truncation)] // Safety: SCREENHEIGHT = 200 fits u8
pub const WIPE_END: u8 = SCREENHEIGHT as u8;

/// Rows below which a column accelerates.
const SLOW_ROWS: i16 = 16;

/// Rows per frame once a column is up to speed.
const FAST_STEP: i16 = 4;

/// What the producer supplies to start a melt.
#[derive(Clone)]
pub struct WipeStart {
    /// Initial per-column accumulators (negative values delay the column).
    pub raw: [i16; SCREENWIDTH],
    /// Combined frame-bank byte offset of old frame row `r`, per row.
    pub line_lookup: &'static [u32],
}

/// Live melt state.
pub struct WipeState {
    raw: [i16; SCREENWIDTH],
    offsets: [u8; SCREENWIDTH],
    wipe_min: u8,
    regular: bool,
    line_lookup: &'static [u32],
}

impl WipeState {
    /// Idle state: every column fully revealed.
    pub const fn new() -> Self {
        Self {
            raw: [0; SCREENWIDTH],
            offsets: [WIPE_END; SCREENWIDTH],
            wipe_min: WIPE_END,
            regular: false,
            line_lookup: &[],
        }
    }

    /// Begin a new melt.
    pub fn start(&mut self, start: &WipeStart) {
        self.raw = start.raw;
        self.offsets = [0; SCREENWIDTH];
        self.wipe_min = 0;
        self.regular = false;
        self.line_lookup = start.line_lookup;
    }

    /// Advance every column by one displayed frame.
    ///
    /// `wipe_min` never decreases and reaches [`WIPE_END`] after finitely
    /// many calls. Returns `true` once the melt is complete.
    #[allow(clippy::arithmetic_side_effects)] // Safety: raw only grows while negative or while raw + dy <= 200
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Safety: v in 0..=200
    pub fn advance(&mut self) -> bool {
        let regular = self.regular;
        let end = i16::from(WIPE_END);
        let mut new_min = end;
        for (raw, offset) in self.raw.iter_mut().zip(self.offsets.iter_mut()) {
            let v = if *raw < 0 {
                if regular {
                    *raw += 1;
                }
                0
            } else {
                let dy = if *raw < SLOW_ROWS {
                    (1 + *raw + i16::from(regular)) / 2
                } else {
                    FAST_STEP
                };
                if raw.saturating_add(dy) > end {
                    end
                } else {
                    *raw += dy;
                    *raw
                }
            };
            *offset = v as u8;
            new_min = new_min.min(v);
        }
        let new_min = new_min as u8;
        debug_assert!(new_min >= self.wipe_min, "wipe_min went backwards");
        self.wipe_min = new_min.max(self.wipe_min);
        self.regular = !self.regular;
        self.is_complete()
    }

    /// Whether every column reached the bottom.
    pub fn is_complete(&self) -> bool {
        self.wipe_min >= WIPE_END
    }

    /// Smallest live offset.
    pub fn wipe_min(&self) -> u8 {
        self.wipe_min
    }

    /// Live offset of column `col`.
    pub fn offset(&self, col: usize) -> u8 {
        self.offsets.get(col).copied().unwrap_or(WIPE_END)
    }

    /// All live offsets.
    pub fn offsets(&self) -> &[u8; SCREENWIDTH] {
        &self.offsets
    }

    /// Combined frame-bank byte offset of old frame row `rel`.
    pub fn line_offset(&self, rel: usize) -> Option<usize> {
        self.line_lookup
            .get(rel)
            .and_then(|&off| usize::try_from(off).ok())
    }
}

impl Default for WipeState {
    fn default() -> Self {
        Self::new()
    }
}

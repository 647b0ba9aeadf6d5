//! Palette to brightness-threshold derivation.
//!
//! The panel has one colour, so every palette entry is reduced to a single
//! brightness in `0..=255`. Brightness is pushed away from a mid-point to
//! keep dithered mid-tones readable, and saturated reds are forced to full
//! brightness so danger cues survive the loss of colour.

use platform::config::NUM_SHARED_PALETTES;

/// Bytes in one RGB palette (256 × RGB).
pub const PALETTE_BYTES: usize = 256 * 3;

/// Entries in a shared palette.
pub const SHARED_PALETTE_LEN: usize = 16;

/// Asymmetric contrast push: values at or above `cutoff` gain `bias`,
/// values below lose it, clamped to `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contrast {
    /// Mid-point
    pub cutoff: i32,
    /// Amount added or removed
    pub bias: i32,
}

impl Contrast {
    /// Push used for palettes loaded from the palette lump.
    pub const REAL: Self = Self { cutoff: 80, bias: 8 };
    /// Push used for synthesized flash palettes.
    pub const FLASH: Self = Self { cutoff: 64, bias: 32 };
    /// Push applied to overlay pixels at blit time.
    pub const OVERLAY: Self = Self { cutoff: 80, bias: 32 };

    /// Apply the push to `value`.
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=255 first
    pub fn apply(self, value: i32) -> u8 {
        let pushed = if value >= self.cutoff {
            value.saturating_add(self.bias).min(255)
        } else {
            value.saturating_sub(self.bias).max(0)
        };
        pushed.clamp(0, 255) as u8
    }
}

/// Luminance approximation `(r + g + b) / 3` as `(r + g + b) * 341 >> 10`.
#[inline]
#[allow(clippy::arithmetic_side_effects)] // Safety: channels <= 256, sum * 341 < 2^19
pub const fn luminance(r: i32, g: i32, b: i32) -> i32 {
    ((r + g + b) * 341) >> 10
}

/// Strongly red, weakly green/blue entries render at full brightness.
#[inline]
#[allow(clippy::arithmetic_side_effects)] // Safety: channels <= 256
const fn is_danger_red(r: i32, g: i32, b: i32) -> bool {
    r >= 100 && g + b <= 40
}

#[inline]
fn brightness(r: i32, g: i32, b: i32, contrast: Contrast) -> u8 {
    if is_danger_red(r, g, b) {
        255
    } else {
        contrast.apply(luminance(r, g, b))
    }
}

/// Blend target and factor (16.16) of a synthesized flash palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FlashBlend {
    target: (i32, i32, i32),
    mul: i32,
}

impl FlashBlend {
    /// Damage flashes (1..9) fade to red, item pickups (9..13) to gold,
    /// anything above is the radiation suit green.
    #[allow(clippy::arithmetic_side_effects)] // Safety: index <= 255, 255 * 65536 fits i32
    fn for_index(index: u8) -> Self {
        let index = i32::from(index);
        if index < 9 {
            Self {
                target: (255, 0, 0),
                mul: index * 65536 / 9,
            }
        } else if index < 13 {
            Self {
                target: (215, 186, 69),
                mul: (index - 8) * 65536 / 8,
            }
        } else {
            Self {
                target: (0, 256, 0),
                mul: 65536 / 8,
            }
        }
    }

    #[inline]
    #[allow(clippy::arithmetic_side_effects)] // Safety: |c0 - c| <= 256, mul <= 2^16 → product < 2^25
    fn channel(c: i32, c0: i32, mul: i32) -> i32 {
        c + (((c0 - c) * mul) >> 16)
    }

    fn apply(self, r: i32, g: i32, b: i32) -> (i32, i32, i32) {
        (
            Self::channel(r, self.target.0, self.mul),
            Self::channel(g, self.target.1, self.mul),
            Self::channel(b, self.target.2, self.mul),
        )
    }
}

/// Outcome of a palette recompute request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaletteSource {
    /// Entries derived from palette `index` of the palette lump.
    Lump,
    /// Entries synthesized from palette 0 of a single-palette lump.
    Synthesized,
    /// The lump does not hold the requested palette; table unchanged.
    Missing,
}

/// The 256-entry brightness table and the shared 16-entry tables derived
/// from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTables {
    palette: [u8; 256],
    shared: [[u8; SHARED_PALETTE_LEN]; NUM_SHARED_PALETTES],
}

impl PaletteTables {
    /// All entries black.
    pub const fn new() -> Self {
        Self {
            palette: [0; 256],
            shared: [[0; SHARED_PALETTE_LEN]; NUM_SHARED_PALETTES],
        }
    }

    /// Brightness of palette index `index`.
    #[inline]
    pub fn brightness(&self, index: u8) -> u8 {
        // u8 index into a 256 table cannot miss.
        self.palette.get(usize::from(index)).copied().unwrap_or(0)
    }

    /// The full 256-entry table.
    pub fn entries(&self) -> &[u8; 256] {
        &self.palette
    }

    /// Entry `index` (masked to 0..16) of shared table `table`.
    #[inline]
    pub fn shared(&self, table: usize, index: u8) -> Option<u8> {
        self.shared
            .get(table)
            .and_then(|t| t.get(usize::from(index & 0x0F)))
            .copied()
    }

    /// Shared table `table`.
    pub fn shared_table(&self, table: usize) -> Option<&[u8; SHARED_PALETTE_LEN]> {
        self.shared.get(table)
    }

    /// Rebuild the 256-entry table for palette `index`.
    ///
    /// `playpal` is the palette lump (`N × 768` bytes). When the lump holds
    /// exactly one palette and `index` is non-zero the palette is synthesized
    /// by blending palette 0 toward the flash colour of `index`; otherwise
    /// palette `index` is read from the lump and gamma corrected through
    /// `gamma` (if any).
    pub fn recompute(&mut self, index: u8, playpal: &[u8], gamma: Option<&[u8; 256]>) -> PaletteSource {
        if playpal.len() == PALETTE_BYTES && index != 0 {
            self.synthesize(index, playpal);
            return PaletteSource::Synthesized;
        }

        let start = usize::from(index).saturating_mul(PALETTE_BYTES);
        let Some(rgb) = playpal.get(start..start.saturating_add(PALETTE_BYTES)) else {
            return PaletteSource::Missing;
        };

        let correct = |c: u8| -> i32 {
            let c = match gamma {
                Some(table) => table.get(usize::from(c)).copied().unwrap_or(c),
                None => c,
            };
            i32::from(c)
        };

        for (entry, px) in self.palette.iter_mut().zip(rgb.chunks_exact(3)) {
            if let [r, g, b] = *px {
                *entry = brightness(correct(r), correct(g), correct(b), Contrast::REAL);
            }
        }
        PaletteSource::Lump
    }

    fn synthesize(&mut self, index: u8, base: &[u8]) {
        let blend = FlashBlend::for_index(index);
        for (entry, px) in self.palette.iter_mut().zip(base.chunks_exact(3)) {
            if let [r, g, b] = *px {
                let (r, g, b) = blend.apply(i32::from(r), i32::from(g), i32::from(b));
                *entry = brightness(r, g, b, Contrast::FLASH);
            }
        }
    }

    /// Rebuild shared table `table` from a patch palette: entry `j` becomes
    /// the brightness of palette index `indices[j]`. Missing indices map to 0.
    pub fn derive_shared(&mut self, table: usize, indices: &[u8]) {
        let palette = self.palette;
        if let Some(shared) = self.shared.get_mut(table) {
            for (j, slot) in shared.iter_mut().enumerate() {
                *slot = indices
                    .get(j)
                    .and_then(|&i| palette.get(usize::from(i)))
                    .copied()
                    .unwrap_or(0);
            }
        }
    }
}

impl Default for PaletteTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    fn lump(colors: &[(u8, u8, u8)], palettes: usize) -> Vec<u8> {
        let mut out = vec![0u8; PALETTE_BYTES * palettes];
        for (i, &(r, g, b)) in colors.iter().enumerate() {
            out[i * 3] = r;
            out[i * 3 + 1] = g;
            out[i * 3 + 2] = b;
        }
        out
    }

    #[test]
    fn contrast_push_is_asymmetric() {
        assert_eq!(Contrast::REAL.apply(80), 88);
        assert_eq!(Contrast::REAL.apply(79), 71);
        assert_eq!(Contrast::REAL.apply(250), 255);
        assert_eq!(Contrast::REAL.apply(3), 0);
        assert_eq!(Contrast::OVERLAY.apply(80), 112);
        assert_eq!(Contrast::OVERLAY.apply(79), 47);
    }

    #[test]
    fn red_white_black() {
        let pal = lump(&[(255, 0, 0), (0, 0, 0), (255, 255, 255)], 1);
        let mut t = PaletteTables::new();
        assert_eq!(t.recompute(0, &pal, None), PaletteSource::Lump);
        assert_eq!(t.brightness(0), 255);
        assert_eq!(t.brightness(1), 0);
        assert_eq!(t.brightness(2), 255);
    }

    #[test]
    fn gamma_table_applies_before_luminance() {
        let pal = lump(&[(60, 60, 60)], 1);
        let mut gamma = [0u8; 256];
        for (i, g) in gamma.iter_mut().enumerate() {
            *g = (i as u8).saturating_mul(2);
        }
        let mut t = PaletteTables::new();
        t.recompute(0, &pal, None);
        // (180 * 341) >> 10 = 59 → below cutoff → 51
        assert_eq!(t.brightness(0), 51);
        t.recompute(0, &pal, Some(&gamma));
        // (360 * 341) >> 10 = 119 → 127
        assert_eq!(t.brightness(0), 127);
    }

    #[test]
    fn red_override_uses_corrected_channels() {
        // (90, 10, 10) is not red enough until gamma lifts red past 100.
        let pal = lump(&[(90, 10, 10)], 1);
        let mut gamma = [0u8; 256];
        for (i, g) in gamma.iter_mut().enumerate() {
            *g = i as u8;
        }
        gamma[90] = 120;
        let mut t = PaletteTables::new();
        t.recompute(0, &pal, None);
        assert_ne!(t.brightness(0), 255);
        t.recompute(0, &pal, Some(&gamma));
        assert_eq!(t.brightness(0), 255);
    }

    #[test]
    fn multi_palette_lump_reads_requested_palette() {
        let mut pal = lump(&[(0, 0, 0)], 3);
        pal[2 * PALETTE_BYTES] = 255;
        pal[2 * PALETTE_BYTES + 1] = 255;
        pal[2 * PALETTE_BYTES + 2] = 255;
        let mut t = PaletteTables::new();
        assert_eq!(t.recompute(2, &pal, None), PaletteSource::Lump);
        assert_eq!(t.brightness(0), 255);
    }

    #[test]
    fn missing_palette_leaves_table_unchanged() {
        let pal = lump(&[(255, 255, 255)], 2);
        let mut t = PaletteTables::new();
        t.recompute(0, &pal, None);
        let before = t.clone();
        assert_eq!(t.recompute(5, &pal, None), PaletteSource::Missing);
        assert_eq!(t, before);
    }

    #[test]
    fn single_palette_lump_synthesizes_flashes() {
        let pal = lump(&[(0, 0, 0), (255, 255, 255)], 1);
        let mut t = PaletteTables::new();
        assert_eq!(t.recompute(8, &pal, None), PaletteSource::Synthesized);
        // black blended 8/9 toward red: r = 226 ≥ 100, g + b = 0 → override
        assert_eq!(t.brightness(0), 255);

        assert_eq!(t.recompute(14, &pal, None), PaletteSource::Synthesized);
        // black blended 1/8 toward (0, 256, 0): g = 32 → lum 10 → 0
        assert_eq!(t.brightness(0), 0);
        // white blended: (223, 255, 223) → lum 233 → 255
        assert_eq!(t.brightness(1), 255);
    }

    #[test]
    fn gold_band_blend_factor() {
        let blend = FlashBlend::for_index(10);
        assert_eq!(blend.target, (215, 186, 69));
        assert_eq!(blend.mul, 2 * 65536 / 8);
        assert_eq!(FlashBlend::for_index(0).mul, 0);
    }

    #[test]
    fn shared_tables_follow_patch_palette() {
        let pal = lump(&[(0, 0, 0), (255, 255, 255)], 1);
        let mut t = PaletteTables::new();
        t.recompute(0, &pal, None);
        let indices = [1u8, 0, 1];
        t.derive_shared(2, &indices);
        assert_eq!(t.shared(2, 0), Some(255));
        assert_eq!(t.shared(2, 1), Some(0));
        assert_eq!(t.shared(2, 2), Some(255));
        assert_eq!(t.shared(2, 15), Some(0));
        assert_eq!(t.shared(3, 0), None);
    }
}

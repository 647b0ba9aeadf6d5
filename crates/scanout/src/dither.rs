//! Ordered dither threshold maps.
//!
//! Every map is a square power-of-two Bayer matrix scaled to brightness
//! thresholds in `1..=255`. A pixel is lit when its brightness is greater
//! than or equal to the threshold at `(x & (size-1), y & (size-1))`, so
//! brightness 0 never lights a pixel and brightness 255 always does.
//!
//! The tables are built at compile time.

/// Identifier of one baked-in threshold map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DitherMap {
    /// 2×2 Bayer
    Bayer2,
    /// 4×4 Bayer
    Bayer4,
    /// 8×8 Bayer
    Bayer8,
    /// 8×8 Bayer with rows and columns swapped
    Bayer8Transposed,
    /// 16×16 Bayer
    Bayer16,
}

static BAYER2: [[u8; 2]; 2] = bayer_table::<2>(false);
static BAYER4: [[u8; 4]; 4] = bayer_table::<4>(false);
static BAYER8: [[u8; 8]; 8] = bayer_table::<8>(false);
static BAYER8_T: [[u8; 8]; 8] = bayer_table::<8>(true);
static BAYER16: [[u8; 16]; 16] = bayer_table::<16>(false);

impl DitherMap {
    /// Side length of the map.
    pub const fn size(self) -> usize {
        match self {
            Self::Bayer2 => 2,
            Self::Bayer4 => 4,
            Self::Bayer8 | Self::Bayer8Transposed => 8,
            Self::Bayer16 => 16,
        }
    }

    /// Threshold for panel pixel `(x, y)`; coordinates wrap modulo the size.
    #[inline]
    #[allow(clippy::indexing_slicing)] // Safety: both indices are masked with size-1
    pub fn threshold(self, x: usize, y: usize) -> u8 {
        match self {
            Self::Bayer2 => BAYER2[y & 1][x & 1],
            Self::Bayer4 => BAYER4[y & 3][x & 3],
            Self::Bayer8 => BAYER8[y & 7][x & 7],
            Self::Bayer8Transposed => BAYER8_T[y & 7][x & 7],
            Self::Bayer16 => BAYER16[y & 15][x & 15],
        }
    }

    /// Whether brightness `value` lights pixel `(x, y)`.
    #[inline]
    pub fn lit(self, value: u8, x: usize, y: usize) -> bool {
        value >= self.threshold(x, y)
    }
}

/// Bayer rank of `(x, y)` in an `n`×`n` matrix, `n = 1 << order`.
///
/// Low coordinate bits are the most significant digits of the rank, which
/// spreads consecutive ranks as far apart as possible.
#[allow(clippy::arithmetic_side_effects)] // Safety: order <= 4, rank < 256
const fn bayer_rank(x: usize, y: usize, order: u32) -> usize {
    let mut rank = 0;
    let mut bit = 0;
    while bit < order {
        let xb = (x >> bit) & 1;
        let yb = (y >> bit) & 1;
        rank = (rank << 2) | (((xb ^ yb) << 1) | yb);
        bit += 1;
    }
    rank
}

#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)] // const evaluation; bounds are loop limits
#[allow(clippy::cast_possible_truncation)] // threshold clamped to 255 before the cast
const fn bayer_table<const N: usize>(transpose: bool) -> [[u8; N]; N] {
    let order = N.trailing_zeros();
    let cells = N * N;
    let mut table = [[0u8; N]; N];
    let mut y = 0;
    while y < N {
        let mut x = 0;
        while x < N {
            let rank = if transpose {
                bayer_rank(y, x, order)
            } else {
                bayer_rank(x, y, order)
            };
            let threshold = (rank + 1) * 256 / cells;
            table[y][x] = if threshold > 255 { 255 } else { threshold as u8 };
            x += 1;
        }
        y += 1;
    }
    table
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    const ALL: [DitherMap; 5] = [
        DitherMap::Bayer2,
        DitherMap::Bayer4,
        DitherMap::Bayer8,
        DitherMap::Bayer8Transposed,
        DitherMap::Bayer16,
    ];

    #[test]
    fn bayer2_matches_classic_layout() {
        // Classic ranks [[0, 2], [3, 1]] scaled by 64.
        assert_eq!(BAYER2, [[64, 192], [255, 128]]);
    }

    #[test]
    fn ranks_form_a_permutation() {
        for order in 1..=4 {
            let n = 1usize << order;
            let mut seen = vec![false; n * n];
            for y in 0..n {
                for x in 0..n {
                    let rank = bayer_rank(x, y, order);
                    assert!(!seen[rank], "order {order}: rank {rank} repeated");
                    seen[rank] = true;
                }
            }
        }
    }

    #[test]
    fn thresholds_never_zero() {
        for map in ALL {
            for y in 0..map.size() {
                for x in 0..map.size() {
                    assert!(map.threshold(x, y) >= 1);
                }
            }
        }
    }

    #[test]
    fn black_never_lit_white_always_lit() {
        for map in ALL {
            for y in 0..16 {
                for x in 0..16 {
                    assert!(!map.lit(0, x, y));
                    assert!(map.lit(255, x, y));
                }
            }
        }
    }

    #[test]
    fn coordinates_wrap() {
        for map in ALL {
            let n = map.size();
            assert_eq!(map.threshold(3, 5), map.threshold(3 + n, 5 + 2 * n));
        }
    }

    #[test]
    fn transposed_swaps_axes() {
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(
                    DitherMap::Bayer8.threshold(x, y),
                    DitherMap::Bayer8Transposed.threshold(y, x)
                );
            }
        }
    }

    #[test]
    fn mid_grey_lights_half_of_bayer8() {
        let lit = (0..8)
            .flat_map(|y| (0..8).map(move |x| (x, y)))
            .filter(|&(x, y)| DitherMap::Bayer8.lit(128, x, y))
            .count();
        assert_eq!(lit, 32);
    }
}

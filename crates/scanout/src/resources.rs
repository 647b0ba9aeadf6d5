//! Read-only assets the refresh cycle draws from.
//!
//! The game side owns patches, overlay lists and palette lumps; the scan-out
//! core only needs to look them up by handle while a panel frame is built.

use crate::overlay::OverlayEntry;
use crate::patch::{Patch, PatchHandle};

/// Asset lookups used during frame setup and rendering.
///
/// Implementations must be cheap: `patch` and `overlays` are called for
/// every active overlay on every scanline.
pub trait DisplayResources {
    /// Patch for `handle`, or `None` if the handle is unknown.
    fn patch(&self, handle: PatchHandle) -> Option<Patch<'_>>;

    /// Overlay list `index` of the current frame.
    fn overlays(&self, index: u8) -> &[OverlayEntry];

    /// The palette lump: consecutive 768-byte RGB palettes.
    fn playpal(&self) -> &[u8];

    /// Active gamma correction level, 0 for none.
    fn gamma_level(&self) -> u8 {
        0
    }

    /// Gamma table `table`. Level `n > 0` uses table `n - 1`.
    fn gamma_table(&self, _table: usize) -> Option<&[u8; 256]> {
        None
    }

    /// Patch whose embedded palette seeds shared table `table`.
    fn shared_palette_source(&self, _table: usize) -> Option<PatchHandle> {
        None
    }

    /// Columns to subtract from a patch's width when tiling repeats of it.
    fn repeat_width_correction(&self, _handle: PatchHandle) -> u16 {
        0
    }
}

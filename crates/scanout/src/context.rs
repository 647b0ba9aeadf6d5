//! The refresh-side display context.
//!
//! One [`DisplayContext`] lives on the refresh core. Each panel frame runs
//! [`DisplayContext::begin_frame`] (pick up hand-off state, per-frame setup)
//! and then [`DisplayContext::render`] (convert and composite every game
//! scanline into the panel buffer). The buffer is then streamed out.

use platform::config::NUM_SHARED_PALETTES;
use platform::{panel_row, SCREENHEIGHT};

use crate::frame::{FrameBanks, PanelBuffer, VideoMode};
use crate::handoff::{FrameDescriptor, FrameHandoff};
use crate::overlay::{entry_for_slot, OverlayScheduler, Visit};
use crate::palette::{PaletteSource, PaletteTables};
use crate::patch::{blit_row, tile_row};
use crate::resources::DisplayResources;
use crate::scanline::{convert_single, convert_wipe, overlay_map};
use crate::wipe::WipeState;

/// State owned by the refresh cycle between panel frames.
pub struct DisplayContext {
    panel: PanelBuffer,
    tables: PaletteTables,
    scheduler: OverlayScheduler,
    wipe: WipeState,
    display: FrameDescriptor,
}

impl DisplayContext {
    /// Blank panel, black palette, no frame displayed.
    pub const fn new() -> Self {
        Self {
            panel: PanelBuffer::new(),
            tables: PaletteTables::new(),
            scheduler: OverlayScheduler::new(),
            wipe: WipeState::new(),
            display: FrameDescriptor {
                bank: crate::frame::Bank::Zero,
                mode: VideoMode::None,
                overlay_index: 0,
                scroll: None,
            },
        }
    }

    /// Frame setup, run once at the start of every panel frame.
    ///
    /// Takes the next submitted frame if one is ready (otherwise the previous
    /// frame is shown again without its scroll), starts a requested melt and,
    /// for overlay modes, rebuilds the overlay schedule, applies a pending
    /// palette change and advances a running melt.
    pub fn begin_frame<R>(&mut self, handoff: &FrameHandoff, resources: &R)
    where
        R: DisplayResources + ?Sized,
    {
        match handoff.poll_frame() {
            Some(frame) => self.display = frame,
            None => self.display.scroll = None,
        }
        if handoff.take_wipe(&mut self.wipe) {
            info!("wipe started");
        }

        let mode = self.display.mode;
        if !mode.runs_frame_setup() {
            return;
        }

        self.scheduler.rebuild(resources.overlays(self.display.overlay_index));

        if let Some(index) = handoff.take_palette() {
            self.apply_palette(index, resources);
        }

        if mode == VideoMode::Wipe && !self.wipe.is_complete() && self.wipe.advance() {
            info!("wipe complete");
        }
    }

    /// Recompute the brightness table for palette `index` and re-derive the
    /// shared tables from their source patches.
    pub fn apply_palette<R>(&mut self, index: u8, resources: &R) -> PaletteSource
    where
        R: DisplayResources + ?Sized,
    {
        let gamma = match resources.gamma_level() {
            0 => None,
            level => resources.gamma_table(usize::from(level.saturating_sub(1))),
        };
        let source = self.tables.recompute(index, resources.playpal(), gamma);
        if source == PaletteSource::Missing {
            warn!("palette {} not in palette lump", index);
            return source;
        }
        debug!("palette {} applied", index);

        for table in 0..NUM_SHARED_PALETTES {
            let Some(handle) = resources.shared_palette_source(table) else {
                continue;
            };
            let Some(patch) = resources.patch(handle) else {
                warn!("shared palette {}: unknown patch {}", table, handle.0);
                continue;
            };
            debug_assert!(patch.shared_palette.is_some(), "shared palette source is not flagged shared");
            debug_assert!(patch.color_count <= 16, "shared palette source has too many colours");
            self.tables.derive_shared(table, patch.palette);
        }
        source
    }

    /// Build the panel buffer for the displayed frame.
    pub fn render<R>(&mut self, frames: &FrameBanks, resources: &R)
    where
        R: DisplayResources + ?Sized,
    {
        let frame = self.display;
        for scanline in 0..SCREENHEIGHT {
            match frame.mode {
                VideoMode::None | VideoMode::Text => {}
                VideoMode::Saving | VideoMode::Double | VideoMode::Single => {
                    let scroll = frame.scroll.and_then(|s| s.get(scanline).copied());
                    convert_single(&mut self.panel, frames, &self.tables, frame.bank, scanline, scroll);
                }
                VideoMode::Wipe => {
                    convert_wipe(&mut self.panel, frames, &self.tables, frame.bank, scanline, &self.wipe);
                }
            }
            if frame.mode.has_overlays() {
                self.draw_overlays(scanline, frame, resources);
            }
        }
    }

    fn draw_overlays<R>(&mut self, scanline: usize, frame: FrameDescriptor, resources: &R)
    where
        R: DisplayResources + ?Sized,
    {
        self.scheduler.merge_starters(scanline);
        let entries = resources.overlays(frame.overlay_index);
        let row = panel_row(scanline);
        let map = overlay_map(frame.bank);
        let panel = &mut self.panel;
        let tables = &self.tables;
        self.scheduler.visit_active(|slot, offset| {
            let Some(entry) = entry_for_slot(entries, slot) else {
                return Visit::Drop;
            };
            let Some(patch) = resources.patch(entry.patch) else {
                warn!("overlay {}: unknown patch {}", slot, entry.patch.0);
                return Visit::Drop;
            };
            let patch_row = scanline.saturating_sub(usize::from(entry.y));
            if patch_row >= usize::from(patch.height) {
                return Visit::Drop;
            }
            let x = usize::from(entry.x);
            *offset = blit_row(panel, tables, &patch, *offset, x, row, map);
            if entry.repeat > 0 {
                let correction = resources.repeat_width_correction(entry.patch);
                let tile = usize::from(patch.width.saturating_sub(correction));
                tile_row(panel, row, x, tile, entry.repeat);
            }
            Visit::Keep
        });
    }

    /// The panel buffer as last rendered.
    pub fn panel(&self) -> &PanelBuffer {
        &self.panel
    }

    /// Frame currently displayed.
    pub fn displayed(&self) -> FrameDescriptor {
        self.display
    }

    /// Current brightness tables.
    pub fn tables(&self) -> &PaletteTables {
        &self.tables
    }

    /// Current melt state.
    pub fn wipe(&self) -> &WipeState {
        &self.wipe
    }
}

impl Default for DisplayContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::frame::Bank;
    use crate::overlay::OverlayEntry;
    use crate::palette::PALETTE_BYTES;
    use crate::patch::{Patch, PatchEncoding, PatchHandle};
    use platform::PANEL_Y_OFFSET;

    /// Palette 0: index 1 white, index 2 mid grey, rest black.
    /// Palette 1: all white.
    struct TestResources {
        playpal: Vec<u8>,
        overlays: Vec<OverlayEntry>,
        white: [u8; 4],
        palette: [u8; 2],
    }

    impl TestResources {
        fn new(overlays: Vec<OverlayEntry>) -> Self {
            let mut playpal = vec![0u8; PALETTE_BYTES * 2];
            playpal[3..6].copy_from_slice(&[255, 255, 255]);
            playpal[6..9].copy_from_slice(&[84, 84, 84]);
            playpal[PALETTE_BYTES..].fill(255);
            Self {
                playpal,
                overlays,
                white: [0x11; 4],
                palette: [0, 1],
            }
        }
    }

    impl DisplayResources for TestResources {
        fn patch(&self, handle: PatchHandle) -> Option<Patch<'_>> {
            match handle.0 {
                // 8×1 solid white bar
                1 => Some(Patch {
                    width: 8,
                    height: 1,
                    encoding: PatchEncoding::Solid4,
                    palette: &self.palette,
                    shared_palette: None,
                    color_count: 2,
                    data: &self.white,
                }),
                // 4×2 shared-palette white block
                2 => Some(Patch {
                    width: 4,
                    height: 2,
                    encoding: PatchEncoding::Solid4,
                    palette: &self.palette,
                    shared_palette: Some(1),
                    color_count: 2,
                    data: &self.white,
                }),
                _ => None,
            }
        }

        fn overlays(&self, _index: u8) -> &[OverlayEntry] {
            &self.overlays
        }

        fn playpal(&self) -> &[u8] {
            &self.playpal
        }

        fn shared_palette_source(&self, table: usize) -> Option<PatchHandle> {
            (table == 1).then_some(PatchHandle(2))
        }
    }

    fn single(bank: Bank) -> FrameDescriptor {
        FrameDescriptor {
            bank,
            mode: VideoMode::Single,
            overlay_index: 0,
            scroll: None,
        }
    }

    #[test]
    fn base_frame_converts_through_palette() {
        let res = TestResources::new(Vec::new());
        let handoff = FrameHandoff::new();
        let mut frames = Box::new(FrameBanks::new());
        frames.row_mut(Bank::One, 10).unwrap()[20] = 1;

        let mut ctx = Box::new(DisplayContext::new());
        handoff.request_palette(0);
        handoff.try_submit_frame(single(Bank::One)).unwrap();
        ctx.begin_frame(&handoff, &res);
        ctx.render(&frames, &res);

        assert_eq!(ctx.displayed().bank, Bank::One);
        assert!(ctx.panel().get(20, PANEL_Y_OFFSET + 10));
        assert_eq!(ctx.panel().lit_count(), 1);
    }

    #[test]
    fn overlays_draw_and_tile() {
        let res = TestResources::new(vec![OverlayEntry {
            x: 16,
            y: 3,
            repeat: 1,
            patch: PatchHandle(1),
        }]);
        let handoff = FrameHandoff::new();
        let frames = Box::new(FrameBanks::new());
        let mut ctx = Box::new(DisplayContext::new());
        handoff.request_palette(0);
        handoff.try_submit_frame(single(Bank::Zero)).unwrap();
        ctx.begin_frame(&handoff, &res);
        ctx.render(&frames, &res);

        let row = PANEL_Y_OFFSET + 3;
        let lit: Vec<usize> = (0..40).filter(|&x| ctx.panel().get(x, row)).collect();
        assert_eq!(lit, (16..32).collect::<Vec<_>>());
        assert!(!ctx.panel().get(16, row + 1), "one row tall");
    }

    #[test]
    fn shared_tables_follow_palette_changes() {
        let res = TestResources::new(vec![OverlayEntry {
            x: 0,
            y: 0,
            repeat: 0,
            patch: PatchHandle(2),
        }]);
        let handoff = FrameHandoff::new();
        let frames = Box::new(FrameBanks::new());
        let mut ctx = Box::new(DisplayContext::new());
        handoff.request_palette(0);
        handoff.try_submit_frame(single(Bank::Zero)).unwrap();
        ctx.begin_frame(&handoff, &res);
        assert_eq!(ctx.tables().shared(1, 1), Some(ctx.tables().brightness(1)));
        ctx.render(&frames, &res);
        for row in 0..2 {
            for x in 0..4 {
                assert!(ctx.panel().get(x, PANEL_Y_OFFSET + row));
            }
        }
    }

    /// Seeds shared table 0 from the plain white bar.
    struct UnflaggedSource(TestResources);

    impl DisplayResources for UnflaggedSource {
        fn patch(&self, handle: PatchHandle) -> Option<Patch<'_>> {
            self.0.patch(handle)
        }

        fn overlays(&self, index: u8) -> &[OverlayEntry] {
            self.0.overlays(index)
        }

        fn playpal(&self) -> &[u8] {
            self.0.playpal()
        }

        fn shared_palette_source(&self, table: usize) -> Option<PatchHandle> {
            (table == 0).then_some(PatchHandle(1))
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "shared palette source is not flagged shared")]
    fn shared_source_must_be_flagged_shared() {
        let res = UnflaggedSource(TestResources::new(Vec::new()));
        let mut ctx = Box::new(DisplayContext::new());
        ctx.apply_palette(0, &res);
    }

    #[test]
    fn unknown_patch_is_dropped() {
        let res = TestResources::new(vec![OverlayEntry {
            x: 0,
            y: 0,
            repeat: 0,
            patch: PatchHandle(99),
        }]);
        let handoff = FrameHandoff::new();
        let frames = Box::new(FrameBanks::new());
        let mut ctx = Box::new(DisplayContext::new());
        handoff.try_submit_frame(single(Bank::Zero)).unwrap();
        ctx.begin_frame(&handoff, &res);
        ctx.render(&frames, &res);
        assert_eq!(ctx.panel().lit_count(), 0);
    }

    #[test]
    fn saving_mode_skips_frame_setup() {
        let res = TestResources::new(Vec::new());
        let handoff = FrameHandoff::new();
        let mut ctx = Box::new(DisplayContext::new());
        handoff.request_palette(1);
        handoff
            .try_submit_frame(FrameDescriptor {
                mode: VideoMode::Saving,
                ..single(Bank::Zero)
            })
            .unwrap();
        ctx.begin_frame(&handoff, &res);
        assert!(handoff.palette_pending(), "palette waits for an overlay mode");
        assert_eq!(ctx.tables().brightness(0), 0);
    }

    #[test]
    fn missed_frame_repeats_without_scroll() {
        static SCROLL: [u8; SCREENHEIGHT] = [0; SCREENHEIGHT];
        let res = TestResources::new(Vec::new());
        let handoff = FrameHandoff::new();
        let mut ctx = Box::new(DisplayContext::new());
        handoff
            .try_submit_frame(FrameDescriptor {
                scroll: Some(&SCROLL),
                ..single(Bank::One)
            })
            .unwrap();
        ctx.begin_frame(&handoff, &res);
        assert!(ctx.displayed().scroll.is_some());
        ctx.begin_frame(&handoff, &res);
        assert_eq!(ctx.displayed().bank, Bank::One);
        assert!(ctx.displayed().scroll.is_none());
    }

    #[test]
    fn missing_palette_keeps_table() {
        let res = TestResources::new(Vec::new());
        let mut ctx = Box::new(DisplayContext::new());
        assert_eq!(ctx.apply_palette(0, &res), PaletteSource::Lump);
        let before = ctx.tables().clone();
        assert_eq!(ctx.apply_palette(7, &res), PaletteSource::Missing);
        assert_eq!(ctx.tables(), &before);
    }
}

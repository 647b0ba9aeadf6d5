//! End-to-end scenarios: palette reduction, patch decoding and a full panel
//! frame rendered through [`DisplayContext`].
//!
//! Run with: cargo test -p scanout --test render_scenarios

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use platform::{PANEL_ROWS, PANEL_Y_OFFSET, SCREENHEIGHT, SCREENWIDTH};
use scanout::overlay::OverlayEntry;
use scanout::palette::PALETTE_BYTES;
use scanout::patch::decode_row;
use scanout::{
    Bank, DisplayContext, DisplayResources, FrameBanks, FrameDescriptor, FrameHandoff,
    PaletteTables, Patch, PatchEncoding, PatchHandle, Texel, VideoMode, WipeStart,
};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

#[test]
fn red_black_white_palette() {
    let mut lump = vec![0u8; PALETTE_BYTES];
    lump[0..9].copy_from_slice(&[255, 0, 0, 0, 0, 0, 255, 255, 255]);
    let mut tables = PaletteTables::new();
    tables.recompute(0, &lump, None);
    assert_eq!(tables.brightness(0), 255, "strong red is always lit");
    assert_eq!(tables.brightness(1), 0, "black sits on the floor");
    assert_eq!(tables.brightness(2), 255, "white sits on the ceiling");
}

// ---------------------------------------------------------------------------
// Patch decoding
// ---------------------------------------------------------------------------

#[test]
fn solid4_width_three() {
    let pal = [10u8, 11, 12, 13];
    let p = Patch {
        width: 3,
        height: 1,
        encoding: PatchEncoding::Solid4,
        palette: &pal,
        shared_palette: None,
        color_count: 4,
        data: &[0x12, 0x03],
    };
    let mut out = Vec::new();
    let end = decode_row(&p, 0, 40, |px, t| out.push((px, t)));
    assert_eq!(
        out,
        vec![(40, Texel::Local(2)), (41, Texel::Local(1)), (42, Texel::Local(3))]
    );
    assert_eq!(end, 2);
}

// ---------------------------------------------------------------------------
// Full frames
// ---------------------------------------------------------------------------

/// Palette 0 maps index 1 to white; one 4×4 white square patch.
struct Assets {
    playpal: Vec<u8>,
    overlays: Vec<OverlayEntry>,
    square: [u8; 8],
}

impl Assets {
    fn new(overlays: Vec<OverlayEntry>) -> Self {
        let mut playpal = vec![0u8; PALETTE_BYTES];
        playpal[3..6].copy_from_slice(&[255, 255, 255]);
        Self {
            playpal,
            overlays,
            square: [0x11; 8],
        }
    }
}

impl DisplayResources for Assets {
    fn patch(&self, handle: PatchHandle) -> Option<Patch<'_>> {
        (handle == PatchHandle(1)).then_some(Patch {
            width: 4,
            height: 4,
            encoding: PatchEncoding::Alpha4,
            palette: &[0, 1],
            shared_palette: None,
            color_count: 2,
            data: &self.square,
        })
    }

    fn overlays(&self, _index: u8) -> &[OverlayEntry] {
        &self.overlays
    }

    fn playpal(&self) -> &[u8] {
        &self.playpal
    }
}

fn lit_rows(ctx: &DisplayContext) -> Vec<usize> {
    (0..PANEL_ROWS)
        .filter(|&row| (0..SCREENWIDTH).any(|x| ctx.panel().get(x, row)))
        .collect()
}

#[test]
fn white_frame_fills_game_area_only() {
    let assets = Assets::new(Vec::new());
    let handoff = FrameHandoff::new();
    let mut frames = Box::new(FrameBanks::new());
    frames.bank_mut(Bank::Zero).fill(1);
    frames.bank_mut(Bank::One).fill(1);

    let mut ctx = Box::new(DisplayContext::new());
    handoff.request_palette(0);
    handoff
        .try_submit_frame(FrameDescriptor {
            bank: Bank::Zero,
            mode: VideoMode::Single,
            overlay_index: 0,
            scroll: None,
        })
        .unwrap();
    ctx.begin_frame(&handoff, &assets);
    ctx.render(&frames, &assets);

    let expected: Vec<usize> = (PANEL_Y_OFFSET..PANEL_Y_OFFSET + SCREENHEIGHT).collect();
    assert_eq!(lit_rows(&ctx), expected);
    assert_eq!(ctx.panel().lit_count(), (SCREENWIDTH * SCREENHEIGHT) as u32);
}

#[test]
fn overlay_square_on_black_frame() {
    let assets = Assets::new(vec![OverlayEntry {
        x: 100,
        y: 50,
        repeat: 0,
        patch: PatchHandle(1),
    }]);
    let handoff = FrameHandoff::new();
    let frames = Box::new(FrameBanks::new());
    let mut ctx = Box::new(DisplayContext::new());
    handoff.request_palette(0);
    handoff
        .try_submit_frame(FrameDescriptor {
            bank: Bank::One,
            mode: VideoMode::Single,
            overlay_index: 0,
            scroll: None,
        })
        .unwrap();
    ctx.begin_frame(&handoff, &assets);
    ctx.render(&frames, &assets);

    assert_eq!(ctx.panel().lit_count(), 16);
    for row in 50..54 {
        for x in 100..104 {
            assert!(ctx.panel().get(x, PANEL_Y_OFFSET + row));
        }
    }
}

#[test]
fn melt_reveals_new_frame_over_successive_refreshes() {
    static LOOKUP: [u32; SCREENHEIGHT] = {
        // Old frame, status bar included, read from bank 1.
        let mut t = [0u32; SCREENHEIGHT];
        let mut r = 0;
        while r < SCREENHEIGHT {
            let row = if r < 168 { r } else { r - 32 };
            t[r] = FrameBanks::line_offset(Bank::One, row) as u32;
            r += 1;
        }
        t
    };

    let assets = Assets::new(Vec::new());
    let handoff = FrameHandoff::new();
    let mut frames = Box::new(FrameBanks::new());
    // New frame in bank 0 is white, old frame in bank 1 is black.
    frames.bank_mut(Bank::Zero).fill(1);
    // Status bar rows of the new frame come from bank 1 and stay black.

    let mut ctx = Box::new(DisplayContext::new());
    handoff.request_palette(0);
    handoff.request_wipe(WipeStart {
        raw: [0; SCREENWIDTH],
        line_lookup: &LOOKUP,
    });
    let wipe_frame = FrameDescriptor {
        bank: Bank::Zero,
        mode: VideoMode::Wipe,
        overlay_index: 0,
        scroll: None,
    };

    let mut last = 0;
    let mut refreshes = 0;
    loop {
        // The producer keeps resubmitting the wipe frame.
        let _ = handoff.try_submit_frame(wipe_frame);
        ctx.begin_frame(&handoff, &assets);
        ctx.render(&frames, &assets);
        let lit = ctx.panel().lit_count();
        assert!(lit >= last, "revealed area never shrinks");
        last = lit;
        refreshes += 1;
        if ctx.wipe().is_complete() {
            break;
        }
        assert!(refreshes < 100);
    }
    let status_rows = (SCREENHEIGHT - 168) * SCREENWIDTH;
    assert_eq!(last as usize, SCREENWIDTH * SCREENHEIGHT - status_rows);
}

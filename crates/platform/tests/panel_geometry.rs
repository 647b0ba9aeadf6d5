//! Panel geometry and stream configuration tests.
//! The timing program, the DMA burst and the conversion code all derive their
//! sizes from `platform::panel`; these tests pin the relationships between them.

#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::assertions_on_constants)]

use platform::{
    panel_row, DataRequest, DmaWords, StreamConfig, TransferSize, MAIN_VIEWHEIGHT,
    PANEL_BUFFER_BYTES, PANEL_BUFFER_WORDS, PANEL_HEADER, PANEL_HEIGHT, PANEL_ROWS, PANEL_STRIDE,
    PANEL_WIDTH, PANEL_Y_OFFSET, SCREENHEIGHT, SCREENWIDTH, STATUS_BAR_SOURCE_SHIFT,
};

// ── Geometry ─────────────────────────────────────────────────────────────────

#[test]
fn game_screen_is_centred_on_panel() {
    let below = PANEL_HEIGHT - (PANEL_Y_OFFSET + SCREENHEIGHT);
    assert_eq!(PANEL_Y_OFFSET, below);
}

#[test]
fn burst_is_whole_rows_plus_spare() {
    assert_eq!(PANEL_STRIDE, 40);
    assert_eq!(PANEL_ROWS, PANEL_HEIGHT + 1);
    assert_eq!(PANEL_BUFFER_BYTES, 10_280);
    assert_eq!(PANEL_BUFFER_WORDS, 2_570);
}

#[test]
fn header_loads_row_and_pixel_counters() {
    assert_eq!(PANEL_HEADER >> 16, (PANEL_ROWS - 1) as u32);
    assert_eq!(PANEL_HEADER & 0xFFFF, (PANEL_WIDTH - 1) as u32);
}

#[test]
fn status_bar_rows_come_from_the_bank_tail() {
    // Screen rows 168..200 read bank rows 136..168.
    assert_eq!(MAIN_VIEWHEIGHT - STATUS_BAR_SOURCE_SHIFT, 136);
    assert_eq!(SCREENHEIGHT - 1 - STATUS_BAR_SOURCE_SHIFT, MAIN_VIEWHEIGHT - 1);
    assert_eq!(SCREENWIDTH, PANEL_WIDTH);
}

// ── Stream configuration ─────────────────────────────────────────────────────

#[test]
fn panel_stream_matches_timing_fifo() {
    let cfg = StreamConfig::panel();
    assert_eq!(cfg.transfer_size, TransferSize::Word);
    assert!(cfg.read_increment);
    assert!(!cfg.write_increment);
    assert!(cfg.irq_on_complete);
    assert_eq!(cfg.dreq, DataRequest::PioTx { pio: 0, sm: 0 });
    assert_eq!(cfg.dreq.dreq(), 0);
    assert_eq!(cfg.transfer_count as usize, PANEL_BUFFER_WORDS);
}

#[test]
fn dreq_numbering() {
    assert_eq!(DataRequest::PioTx { pio: 0, sm: 3 }.dreq(), 3);
    assert_eq!(DataRequest::PioTx { pio: 1, sm: 0 }.dreq(), 8);
    assert_eq!(DataRequest::PioTx { pio: 1, sm: 3 }.dreq(), 11);
}

#[test]
fn word_arrays_stream_as_is() {
    let words = [1u32, 2, 3];
    assert_eq!(words.word_len(), 3);
    assert_eq!(words.words(), &[1, 2, 3]);
}

proptest::proptest! {
    /// Every game screen row lands on a visible panel row.
    #[test]
    fn screen_rows_map_inside_panel(row in 0usize..SCREENHEIGHT) {
        let p = panel_row(row);
        proptest::prop_assert!(p >= PANEL_Y_OFFSET);
        proptest::prop_assert!(p < PANEL_HEIGHT);
        proptest::prop_assert_eq!(p - row, PANEL_Y_OFFSET);
    }
}

//! Overlay placements and the per-frame active-set scheduler.
//!
//! Overlays are addressed by slot: slot `i` (1-based) is entry `i - 1` of the
//! overlay list, and slot 0 anchors the active chain. Two index arrays carry
//! all scheduling state, so nothing is allocated while the panel is built:
//!
//! - `starters[y]` heads an ascending chain (linked through `next`) of the
//!   slots whose top row is `y`.
//! - `next[0]` heads the ascending chain of slots currently being drawn.
//!
//! Before each row the row's starters are merged into the active chain; while
//! drawing, slots whose bottom edge was passed are unlinked.

use heapless::Vec;
use platform::{config::MAX_OVERLAYS, SCREENHEIGHT};

use crate::patch::PatchHandle;

/// Number of scheduler slots including the anchor slot 0.
pub const OVERLAY_SLOTS: usize = MAX_OVERLAYS + 1;

/// One placement of a patch on the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverlayEntry {
    /// Left column
    pub x: u16,
    /// Top row (game screen)
    pub y: u8,
    /// Extra copies drawn to the right of the first
    pub repeat: u8,
    /// Patch to draw
    pub patch: PatchHandle,
}

/// Overlay placements for one frame, at most [`MAX_OVERLAYS`].
pub type OverlayList = Vec<OverlayEntry, MAX_OVERLAYS>;

/// Outcome of visiting an active overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Still spans this row; stays active.
    Keep,
    /// Bottom edge passed; unlink it.
    Drop,
}

/// Index-array scheduler rebuilt once per displayed frame.
pub struct OverlayScheduler {
    next: [u8; OVERLAY_SLOTS],
    starters: [u8; SCREENHEIGHT],
    offsets: [usize; OVERLAY_SLOTS],
}

impl OverlayScheduler {
    /// Empty scheduler.
    pub const fn new() -> Self {
        Self {
            next: [0; OVERLAY_SLOTS],
            starters: [0; SCREENHEIGHT],
            offsets: [0; OVERLAY_SLOTS],
        }
    }

    /// Reset all chains and decode offsets, then bucket `entries` by top row.
    ///
    /// Entries are inserted in reverse so each bucket chain is ascending.
    /// Entries whose top row is off screen are never scheduled.
    #[allow(clippy::cast_possible_truncation)] // Safety: entries.len() <= MAX_OVERLAYS < 256
    pub fn rebuild(&mut self, entries: &[OverlayEntry]) {
        self.next.fill(0);
        self.starters.fill(0);
        self.offsets.fill(0);
        let count = entries.len().min(MAX_OVERLAYS);
        debug_assert!(entries.len() <= MAX_OVERLAYS, "overlay list too long");
        for (i, entry) in entries.iter().enumerate().take(count).rev() {
            let slot = i.saturating_add(1) as u8;
            let y = usize::from(entry.y);
            debug_assert!(y < SCREENHEIGHT, "overlay starts below the screen");
            let (Some(head), Some(link)) = (self.starters.get_mut(y), self.next.get_mut(usize::from(slot)))
            else {
                continue;
            };
            *link = *head;
            *head = slot;
        }
    }

    #[inline]
    fn link(&self, slot: u8) -> u8 {
        self.next.get(usize::from(slot)).copied().unwrap_or(0)
    }

    #[inline]
    fn set_link(&mut self, slot: u8, to: u8) {
        if let Some(l) = self.next.get_mut(usize::from(slot)) {
            *l = to;
        }
    }

    /// Merge the slots starting at `scanline` into the active chain,
    /// preserving ascending order.
    pub fn merge_starters(&mut self, scanline: usize) {
        let mut vp = self.starters.get(scanline).copied().unwrap_or(0);
        let mut prev = 0u8;
        while vp != 0 {
            let following = self.link(vp);
            // Both chains ascend, so the scan resumes where the last insert left off.
            while self.link(prev) != 0 && self.link(prev) < vp {
                prev = self.link(prev);
            }
            debug_assert!(prev != vp && self.link(prev) != vp, "slot already active");
            self.set_link(vp, self.link(prev));
            self.set_link(prev, vp);
            prev = vp;
            vp = following;
        }
    }

    /// Walk the active chain in ascending slot order. `visit` receives the
    /// slot and its decode offset (to be advanced in place) and decides
    /// whether the slot stays active.
    pub fn visit_active<F>(&mut self, mut visit: F)
    where
        F: FnMut(usize, &mut usize) -> Visit,
    {
        let mut prev = 0u8;
        loop {
            let vp = self.link(prev);
            if vp == 0 {
                break;
            }
            let slot = usize::from(vp);
            let mut scratch = 0;
            let offset = self.offsets.get_mut(slot).unwrap_or(&mut scratch);
            match visit(slot, offset) {
                Visit::Keep => prev = vp,
                Visit::Drop => {
                    let after = self.link(vp);
                    self.set_link(prev, after);
                }
            }
        }
    }

    /// Slots currently in the active chain, ascending.
    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        let mut cur = self.link(0);
        core::iter::from_fn(move || {
            if cur == 0 {
                None
            } else {
                let slot = cur;
                cur = self.link(cur);
                Some(usize::from(slot))
            }
        })
    }

    /// Decode offset of `slot`.
    pub fn offset(&self, slot: usize) -> usize {
        self.offsets.get(slot).copied().unwrap_or(0)
    }
}

impl Default for OverlayScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry for 1-based `slot`.
pub fn entry_for_slot(entries: &[OverlayEntry], slot: usize) -> Option<&OverlayEntry> {
    entries.get(slot.checked_sub(1)?)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    fn entry(y: u8) -> OverlayEntry {
        OverlayEntry {
            y,
            ..OverlayEntry::default()
        }
    }

    /// Drive one frame; every overlay is `h` rows tall.
    fn schedule(entries: &[OverlayEntry], h: usize) -> std::vec::Vec<std::vec::Vec<usize>> {
        let mut s = OverlayScheduler::new();
        s.rebuild(entries);
        let mut rows = std::vec::Vec::new();
        for scanline in 0..SCREENHEIGHT {
            s.merge_starters(scanline);
            let mut drawn = std::vec::Vec::new();
            s.visit_active(|slot, offset| {
                let y = usize::from(entries[slot - 1].y);
                if scanline - y < h {
                    drawn.push(slot);
                    *offset += 1;
                    Visit::Keep
                } else {
                    Visit::Drop
                }
            });
            rows.push(drawn);
        }
        rows
    }

    #[test]
    fn starters_chain_ascends() {
        let entries = [entry(5), entry(3), entry(5), entry(5)];
        let mut s = OverlayScheduler::new();
        s.rebuild(&entries);
        assert_eq!(s.starters[5], 1);
        assert_eq!(s.next[1], 3);
        assert_eq!(s.next[3], 4);
        assert_eq!(s.next[4], 0);
        assert_eq!(s.starters[3], 2);
    }

    #[test]
    fn rows_draw_spanning_overlays_in_slot_order() {
        let entries = [entry(10), entry(4), entry(10), entry(12)];
        let rows = schedule(&entries, 4);
        assert!(rows[3].is_empty());
        assert_eq!(rows[4], vec![2]);
        assert_eq!(rows[10], vec![1, 3]);
        assert_eq!(rows[12], vec![1, 3, 4]);
        assert_eq!(rows[14], vec![4]);
        assert!(rows[16].is_empty());
    }

    #[test]
    fn offsets_advance_once_per_drawn_row() {
        let entries = [entry(0), entry(1)];
        let mut s = OverlayScheduler::new();
        s.rebuild(&entries);
        for scanline in 0..6 {
            s.merge_starters(scanline);
            s.visit_active(|slot, offset| {
                let y = usize::from(entries[slot - 1].y);
                if scanline - y < 3 {
                    *offset += 10;
                    Visit::Keep
                } else {
                    Visit::Drop
                }
            });
        }
        assert_eq!(s.offset(1), 30);
        assert_eq!(s.offset(2), 30);
        assert_eq!(s.active().count(), 0);
    }

    #[test]
    fn rebuild_resets_previous_frame() {
        let mut s = OverlayScheduler::new();
        s.rebuild(&[entry(0)]);
        s.merge_starters(0);
        assert_eq!(s.active().collect::<std::vec::Vec<_>>(), vec![1]);
        s.rebuild(&[]);
        assert_eq!(s.active().count(), 0);
        assert_eq!(s.offset(1), 0);
    }

    #[test]
    fn late_starter_lands_between_active_slots() {
        let entries = [entry(0), entry(2), entry(0)];
        let mut s = OverlayScheduler::new();
        s.rebuild(&entries);
        s.merge_starters(0);
        s.merge_starters(1);
        s.merge_starters(2);
        assert_eq!(s.active().collect::<std::vec::Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn entry_for_slot_is_one_based() {
        let entries = [entry(7), entry(9)];
        assert_eq!(entry_for_slot(&entries, 1).map(|e| e.y), Some(7));
        assert!(entry_for_slot(&entries, 0).is_none());
        assert!(entry_for_slot(&entries, 3).is_none());
    }
}

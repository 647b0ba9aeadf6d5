//! Frame hand-off between the producer core and the panel refresh.
//!
//! The producer publishes a [`FrameDescriptor`] and the refresh cycle picks
//! it up at the start of a panel frame. Two counting semaphores bound the
//! frames in flight:
//!
//! ```text
//! producer                         refresh cycle
//! ────────                         ─────────────
//! slot_free.acquire (≤ 2 ahead)
//! next = descriptor
//! frame_ready.release ───────────▶ frame_ready.try_acquire
//!                                  display = next
//! ◀──────────────────────────────── slot_free.release
//! ```
//!
//! The descriptor is published and read as one value under a critical
//! section, so the refresh side never sees fields from two submissions.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::semaphore::{GreedySemaphore, Semaphore};
use platform::config::FRAMES_IN_FLIGHT;
use thiserror_no_std::Error;

use crate::frame::{Bank, VideoMode};
use crate::wipe::{WipeStart, WipeState};

/// Everything the refresh cycle needs to show one produced frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameDescriptor {
    /// Bank holding the frame
    pub bank: Bank,
    /// Conversion mode
    pub mode: VideoMode,
    /// Overlay list to composite
    pub overlay_index: u8,
    /// Optional per-scanline scroll values (single mode)
    pub scroll: Option<&'static [u8]>,
}

/// Hand-off errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandoffError {
    /// Two frames are already waiting for the panel.
    #[error("frame hand-off full")]
    Busy,
}

/// Shared state between producer and refresh cycle. Lives in a `static`.
pub struct FrameHandoff {
    slot_free: GreedySemaphore<CriticalSectionRawMutex>,
    frame_ready: GreedySemaphore<CriticalSectionRawMutex>,
    next: Mutex<CriticalSectionRawMutex, Cell<FrameDescriptor>>,
    queued: Mutex<CriticalSectionRawMutex, Cell<u8>>,
    palette: Mutex<CriticalSectionRawMutex, Cell<Option<u8>>>,
    wipe: Mutex<CriticalSectionRawMutex, RefCell<Option<WipeStart>>>,
}

impl FrameHandoff {
    /// Empty hand-off with [`FRAMES_IN_FLIGHT`] free slots.
    pub const fn new() -> Self {
        Self {
            slot_free: GreedySemaphore::new(FRAMES_IN_FLIGHT),
            frame_ready: GreedySemaphore::new(0),
            next: Mutex::new(Cell::new(FrameDescriptor {
                bank: Bank::Zero,
                mode: VideoMode::None,
                overlay_index: 0,
                scroll: None,
            })),
            queued: Mutex::new(Cell::new(0)),
            palette: Mutex::new(Cell::new(None)),
            wipe: Mutex::new(RefCell::new(None)),
        }
    }

    fn publish(&self, frame: FrameDescriptor) {
        self.next.lock(|next| next.set(frame));
        self.queued.lock(|q| q.set(q.get().saturating_add(1)));
        self.frame_ready.release(1);
    }

    /// Submit a frame, waiting while two frames are already in flight.
    pub async fn submit_frame(&self, frame: FrameDescriptor) {
        match self.slot_free.acquire(1).await {
            Ok(permit) => {
                permit.disarm();
            }
            // GreedySemaphore::Error is Infallible.
            Err(e) => match e {},
        }
        self.publish(frame);
    }

    /// Submit a frame without waiting.
    pub fn try_submit_frame(&self, frame: FrameDescriptor) -> Result<(), HandoffError> {
        let permit = self.slot_free.try_acquire(1).ok_or(HandoffError::Busy)?;
        permit.disarm();
        self.publish(frame);
        Ok(())
    }

    /// Refresh side: take the latest submitted frame if one is ready and free
    /// its slot. Never blocks.
    pub fn poll_frame(&self) -> Option<FrameDescriptor> {
        let permit = self.frame_ready.try_acquire(1)?;
        permit.disarm();
        let frame = self.next.lock(Cell::get);
        self.queued.lock(|q| q.set(q.get().saturating_sub(1)));
        self.slot_free.release(1);
        debug!("frame accepted: bank {}, overlays {}", frame.bank.index(), frame.overlay_index);
        Some(frame)
    }

    /// Submissions the refresh side has not picked up yet. Zero means the
    /// latest submission is on screen and the other bank is free to draw.
    pub fn queued(&self) -> usize {
        usize::from(self.queued.lock(Cell::get))
    }

    /// Ask for palette `index` to be applied at the next frame setup.
    pub fn request_palette(&self, index: u8) {
        self.palette.lock(|p| p.set(Some(index)));
    }

    /// Refresh side: take the pending palette request.
    pub fn take_palette(&self) -> Option<u8> {
        self.palette.lock(Cell::take)
    }

    /// Whether a palette request is waiting.
    pub fn palette_pending(&self) -> bool {
        self.palette.lock(|p| p.get().is_some())
    }

    /// Ask for a melt to start at the next frame setup.
    pub fn request_wipe(&self, start: WipeStart) {
        self.wipe.lock(|w| *w.borrow_mut() = Some(start));
    }

    /// Refresh side: start the pending melt on `state`, if any.
    pub fn take_wipe(&self, state: &mut WipeState) -> bool {
        self.wipe.lock(|w| match w.borrow_mut().take() {
            Some(start) => {
                state.start(&start);
                true
            }
            None => false,
        })
    }
}

impl Default for FrameHandoff {
    fn default() -> Self {
        Self::new()
    }
}

//! Frame memory shared between the producer core and the refresh core.
//!
//! Sharing rests on the hand-off: the producer draws only once nothing is
//! queued, so the displayed bank is the one it submitted last, and it writes
//! only the animated rows of the other bank. It draws nothing while a melt
//! may be reading both. The status rows are written once, before core 1
//! starts. The refresh side borrows the banks for one cycle at a time, never
//! for longer. The accessors are `unsafe` because that discipline lives in
//! the callers.

use core::cell::UnsafeCell;

use scanout::{Bank, FrameBanks};

/// Both frame banks, placed in a `static`.
pub struct SharedFrameBanks {
    banks: UnsafeCell<FrameBanks>,
}

// SAFETY: concurrent access is serialised by the frame hand-off (see module
// docs); every accessor is unsafe and states its obligation.
unsafe impl Sync for SharedFrameBanks {}

impl SharedFrameBanks {
    /// Zeroed banks.
    pub const fn new() -> Self {
        Self {
            banks: UnsafeCell::new(FrameBanks::new()),
        }
    }

    /// Read view for the refresh cycle.
    ///
    /// # Safety
    ///
    /// The caller must drop the reference when its refresh cycle ends, and
    /// must not hold it across a point where the producer may write the bank
    /// currently being displayed.
    pub unsafe fn frames(&self) -> &FrameBanks {
        // SAFETY: forwarded to the caller.
        unsafe { &*self.banks.get() }
    }

    /// Write access to one bank for the producer.
    ///
    /// # Safety
    ///
    /// `bank` must not be the bank of any frame still in flight or on
    /// screen, and only one producer may draw at a time.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn bank_mut(&self, bank: Bank) -> &mut [u8] {
        // SAFETY: forwarded to the caller.
        unsafe { (*self.banks.get()).bank_mut(bank) }
    }

    /// Exclusive access for single-threaded setup and tests.
    pub fn get_mut(&mut self) -> &mut FrameBanks {
        self.banks.get_mut()
    }
}

impl Default for SharedFrameBanks {
    fn default() -> Self {
        Self::new()
    }
}

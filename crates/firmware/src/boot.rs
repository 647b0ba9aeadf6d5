//! Two-core boot sequence for the EL panel firmware.
//!
//! Initialization order (MUST be respected):
//!   1. Core 0: `embassy_rp::init`, then take DMA_IRQ_0 off core 0's NVIC
//!   2. Core 0: launch core 1 with its own stack
//!   3. Core 1: claim PIO0 SM0, the DMA channel and the panel pins
//!   4. Core 1: enable DMA_IRQ_0 locally and start the refresh executor
//!   5. Core 1: signal "core launched"
//!   6. Core 0: wait for the launch signal, then seal start-up allocation
//!   7. Core 0: run the producer
//!
//! The DMA completion interrupt must fire on the core that runs the refresh
//! task; the RP2040 NVIC is per core, so core 0 has to let go of it.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use thiserror_no_std::Error;

/// Ordered list of boot sequence steps for documentation and testing.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Core 0: init clocks and peripherals, release DMA_IRQ_0",
    "2. Core 0: spawn core 1",
    "3. Core 1: claim PIO0 SM0, DMA channel and panel pins",
    "4. Core 1: enable DMA_IRQ_0 and start refresh executor",
    "5. Core 1: signal core launched",
    "6. Core 0: wait for launch, seal start-up allocation",
    "7. Core 0: run producer",
];

/// Boot ordering errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// Start-up allocation was sealed before core 1 reported in.
    #[error("sealed before core 1 launched")]
    NotLaunched,
    /// Start-up allocation is already sealed.
    #[error("start-up allocation already sealed")]
    Sealed,
}

/// Launch handshake between the cores.
///
/// Core 1 calls [`signal_launched`](Self::signal_launched) once its hardware
/// is claimed; core 0 awaits [`wait_launched`](Self::wait_launched) and then
/// calls [`seal`](Self::seal), after which no more `static` cells may be
/// claimed.
pub struct CoreLaunch {
    launched: Signal<CriticalSectionRawMutex, ()>,
    has_launched: AtomicBool,
    sealed: AtomicBool,
}

impl CoreLaunch {
    /// Fresh handshake, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            launched: Signal::new(),
            has_launched: AtomicBool::new(false),
            sealed: AtomicBool::new(false),
        }
    }

    /// Core 1: hardware claimed, refresh running.
    pub fn signal_launched(&self) {
        self.has_launched.store(true, Ordering::Release);
        self.launched.signal(());
    }

    /// Core 0: wait for core 1 to report in.
    pub async fn wait_launched(&self) {
        if self.has_launched.load(Ordering::Acquire) {
            return;
        }
        self.launched.wait().await;
    }

    /// Whether core 1 has reported in.
    pub fn is_launched(&self) -> bool {
        self.has_launched.load(Ordering::Acquire)
    }

    /// Close start-up allocation.
    pub fn seal(&self) -> Result<(), BootError> {
        if !self.is_launched() {
            return Err(BootError::NotLaunched);
        }
        if self.sealed.load(Ordering::Acquire) {
            return Err(BootError::Sealed);
        }
        self.sealed.store(true, Ordering::Release);
        Ok(())
    }

    /// Whether `static` cells may still be claimed.
    pub fn allocation_allowed(&self) -> bool {
        !self.sealed.load(Ordering::Acquire)
    }
}

impl Default for CoreLaunch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "hardware")]
pub mod hw {
    //! Interrupt routing. Only compiled for the RP2040 target.

    use embassy_rp::interrupt::{self, InterruptExt, Priority};

    /// Core 0: stop taking the DMA completion interrupt.
    pub fn release_dma_irq() {
        interrupt::DMA_IRQ_0.disable();
    }

    /// Core 1: take the DMA completion interrupt above the refresh executor.
    pub fn claim_dma_irq() {
        interrupt::DMA_IRQ_0.set_priority(Priority::P2);
        // SAFETY: the embassy-rp DMA handler only touches channel registers
        // and wakers; enabling it on this core's NVIC is sound once core 0
        // has disabled it.
        unsafe { interrupt::DMA_IRQ_0.enable() };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

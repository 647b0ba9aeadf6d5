//! Cortex-M0+ fault handler for both RP2040 cores.
//!
//! The M0+ has no configurable fault exceptions: bus errors, invalid
//! instructions and unaligned accesses all escalate to **HardFault**. There is
//! no MPU guard on either stack, so an overflow of core 1's 8 KiB stack shows
//! up here only once it hits an invalid address; before that it corrupts the
//! statics placed below it.
//!
//! The `#[cortex_m_rt::exception]` attribute needs the ARM target, so the
//! module is only compiled with the `hardware` feature.

#![allow(clippy::doc_markdown)] // HardFault, SIO and RTT are plain text here

/// HardFault exception handler.
///
/// Logs the stacked PC, LR and the faulting core (SIO CPUID) over RTT, then
/// halts through the defmt panic path. Returning from a HardFault handler is
/// undefined behaviour, hence `-> !`.
#[cortex_m_rt::exception]
#[allow(unsafe_code)]
unsafe fn HardFault(ef: &cortex_m_rt::ExceptionFrame) -> ! {
    let core = embassy_rp::pac::SIO.cpuid().read();
    defmt::panic!(
        "HardFault on core {=u32}: pc=0x{=u32:08x} lr=0x{=u32:08x}",
        core,
        ef.pc(),
        ef.lr()
    );
}

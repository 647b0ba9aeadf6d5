//! Deferred refresh task.
//!
//! On hardware this task runs on an `InterruptExecutor` bound to a software
//! interrupt on core 1, which plays the part of the always-pending low
//! priority handler: the DMA completion interrupt wakes it, it rebuilds and
//! restarts the stream, and it is never blocked by the producer.

use embedded_hal::digital::StatefulOutputPin;
use platform::PanelLink;
use scanout::{DisplayResources, FrameHandoff};

use super::driver::PanelDriver;
use crate::shared::SharedFrameBanks;

/// Run one refresh and log its failure. Returns whether the frame went out.
///
/// The banks are borrowed for this cycle only.
pub async fn run_cycle<L, P, R>(
    driver: &mut PanelDriver<'_, L, P>,
    handoff: &FrameHandoff,
    banks: &SharedFrameBanks,
    resources: &R,
) -> bool
where
    L: PanelLink,
    P: StatefulOutputPin,
    R: DisplayResources + ?Sized,
{
    // SAFETY: the view is dropped when this cycle ends. While it lives the
    // producer writes only the animated rows of the bank that is neither
    // displayed nor queued, and nothing during a melt.
    let frames = unsafe { banks.frames() };
    match driver.refresh_cycle(handoff, frames, resources).await {
        Ok(()) => true,
        Err(e) => {
            #[cfg(feature = "defmt")]
            defmt::error!("refresh cycle failed: {}", e);
            #[cfg(feature = "tracing")]
            tracing::error!("refresh cycle failed: {}", e);
            let _ = e;
            false
        }
    }
}

/// Refresh the panel forever. Errors are logged and the next cycle proceeds
/// with a freshly rendered buffer.
pub async fn refresh_loop<L, P, R>(
    driver: &mut PanelDriver<'_, L, P>,
    handoff: &FrameHandoff,
    banks: &SharedFrameBanks,
    resources: &R,
) -> !
where
    L: PanelLink,
    P: StatefulOutputPin,
    R: DisplayResources + ?Sized,
{
    loop {
        run_cycle(driver, handoff, banks, resources).await;
        // Let same-priority work run between panel frames.
        embassy_futures::yield_now().await;
    }
}

/// Embassy task wrapper for the refresh loop (hardware target only).
///
/// Spawned on the core 1 interrupt executor after the PIO link is running.
#[cfg(feature = "hardware")]
#[embassy_executor::task]
pub async fn refresh_task(
    link: super::pio::PioPanelLink<'static, embassy_rp::peripherals::DMA_CH0>,
    ctx: &'static mut scanout::DisplayContext,
    refresh_pin: embassy_rp::gpio::Output<'static>,
    complete_pin: embassy_rp::gpio::Output<'static>,
    handoff: &'static FrameHandoff,
    banks: &'static SharedFrameBanks,
    resources: &'static crate::resources::BuiltinResources,
) {
    defmt::info!("refresh task running");
    let mut driver = PanelDriver::new(link, ctx, refresh_pin, complete_pin);
    refresh_loop(&mut driver, handoff, banks, resources).await
}

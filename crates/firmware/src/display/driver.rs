//! Panel output driver.
//!
//! Owns the panel link, the two diagnostic pins and a borrowed
//! [`DisplayContext`]. One call to [`PanelDriver::refresh_cycle`] is one
//! physical panel frame:
//!
//! ```text
//! deferred entry ──▶ toggle GPIO14
//!                    frame setup (hand-off, overlays, palette, wipe)
//!                    render 200 game scanlines into the panel buffer
//!                    push geometry header
//!                    DMA burst of the panel buffer ──▶ completion IRQ
//! trigger_refresh ◀─────────────────────────────────────────┘
//!                    toggle GPIO15, count the frame
//! ```
//!
//! The hardware link ([`super::pio::PioPanelLink`]) resolves `stream_frame`
//! from the DMA completion interrupt, so the interrupt itself only
//! acknowledges the channel and wakes the refresh task.

use embedded_hal::digital::StatefulOutputPin;
use platform::{DmaWords, LinkError, PanelLink, PANEL_HEADER};
use scanout::{DisplayContext, DisplayResources, FrameBanks, FrameHandoff};
use thiserror_no_std::Error;

/// Errors returned by the panel driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The panel link rejected the header or the burst.
    #[error("panel link: {0}")]
    Link(#[from] LinkError),
    /// A diagnostic pin could not be toggled.
    #[error("diagnostic pin error")]
    Pin,
}

/// Drives one EL panel from a [`DisplayContext`].
///
/// Generic over:
/// - `L`: the [`PanelLink`] (PIO + DMA on hardware, [`platform::mocks::MockLink`] in tests).
/// - `P`: the diagnostic [`StatefulOutputPin`]s.
pub struct PanelDriver<'a, L, P> {
    link: L,
    ctx: &'a mut DisplayContext,
    refresh_pin: P,
    complete_pin: P,
    frames_sent: u32,
}

impl<'a, L, P> PanelDriver<'a, L, P>
where
    L: PanelLink,
    P: StatefulOutputPin,
{
    /// Create a driver around a started link.
    pub fn new(link: L, ctx: &'a mut DisplayContext, refresh_pin: P, complete_pin: P) -> Self {
        Self {
            link,
            ctx,
            refresh_pin,
            complete_pin,
            frames_sent: 0,
        }
    }

    /// Run one deferred refresh: rebuild the panel buffer and stream it.
    ///
    /// On a link error the buffer is left rendered and the frame is not
    /// counted; the next cycle rebuilds it from scratch.
    pub async fn refresh_cycle<R>(
        &mut self,
        handoff: &FrameHandoff,
        frames: &FrameBanks,
        resources: &R,
    ) -> Result<(), DriverError>
    where
        R: DisplayResources + ?Sized,
    {
        self.refresh_pin.toggle().map_err(|_| DriverError::Pin)?;

        self.ctx.begin_frame(handoff, resources);
        self.ctx.render(frames, resources);

        self.link.send_header(PANEL_HEADER).await?;
        self.link.stream_frame(self.ctx.panel().words()).await?;

        self.trigger_refresh()
    }

    /// Completion side of a burst: mark the diagnostic pin and count the
    /// frame. The deferred context is re-armed by the caller looping.
    pub fn trigger_refresh(&mut self) -> Result<(), DriverError> {
        self.complete_pin.toggle().map_err(|_| DriverError::Pin)?;
        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(())
    }

    /// Frames fully streamed since start-up (wrapping).
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    /// The display context.
    pub fn context(&self) -> &DisplayContext {
        self.ctx
    }

    /// The panel link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Release the link and the pins.
    pub fn release(self) -> (L, P, P) {
        (self.link, self.refresh_pin, self.complete_pin)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Panel link abstraction layer
//!
//! The physical panel is driven by a timing generator (a PIO state machine on
//! RP2040) fed by a DMA channel. [`PanelLink`] is the seam between the refresh
//! cycle and that hardware so the cycle can be tested on the host.

use thiserror_no_std::Error;

/// Transport that streams one packed 1 bpp frame to the panel.
///
/// One refresh cycle is always: [`send_header`](PanelLink::send_header) with
/// the geometry word, then [`stream_frame`](PanelLink::stream_frame) with the
/// full panel buffer.
pub trait PanelLink {
    /// Push the geometry header word into the timing generator's command FIFO.
    fn send_header(
        &mut self,
        header: u32,
    ) -> impl core::future::Future<Output = Result<(), LinkError>>;

    /// Start a DMA burst of `words` into the timing generator and resolve when
    /// the completion interrupt for that burst has fired.
    fn stream_frame(
        &mut self,
        words: &[u32],
    ) -> impl core::future::Future<Output = Result<(), LinkError>>;
}

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The timing generator has not been started.
    #[error("timing generator not running")]
    NotRunning,
    /// A burst was requested while the previous one is still in flight.
    #[error("DMA channel busy")]
    Busy,
    /// The burst length does not match the configured transfer count.
    #[error("burst length does not match panel geometry")]
    Length,
}

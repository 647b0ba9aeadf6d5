//! EL panel output: the refresh-cycle driver, the deferred refresh task and,
//! on hardware, the RP2040 PIO + DMA link.

pub mod driver;
pub mod task;

#[cfg(feature = "hardware")]
pub mod pio;

// The driver and task are always compiled (no hardware gate) so that
// `cargo test` can exercise the refresh cycle on the host.
pub use driver::{DriverError, PanelDriver};
pub use task::{refresh_loop, run_cycle};

#[cfg(feature = "hardware")]
pub use pio::{PanelPins, PioPanelLink};

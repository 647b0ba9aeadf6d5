//! RP2040 panel link: PIO0 state machine 0 generates the EL panel timing,
//! one DMA channel streams the packed frame into its TX FIFO.
//!
//! # Pins
//!
//! | Signal | GPIO | PIO role |
//! |--------|------|----------|
//! | VS     | 16   | set pin 0 |
//! | HS     | 17   | set pin 1 |
//! | VCLK   | 18   | side-set |
//! | VID    | 19   | out pin  |
//!
//! # Program
//!
//! Each frame starts with the geometry header word: the low half loads the
//! pixel counter (`width - 1`), the high half the row counter (`rows - 1`).
//! The frame words follow, shifted out LSB first, one bit per VCLK period.
//! VS is raised for the first row only; HS pulses after every row.
//!
//! With the system clock at 125 MHz and a divider of 10 the state machine
//! runs at 12.5 MHz; two instructions per pixel give a 6.25 MHz pixel clock.

use embassy_rp::dma::Channel;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{
    Common, Config, Direction, FifoJoin, Pin, ShiftConfig, ShiftDirection, StateMachine,
};
use embassy_rp::{Peripheral, PeripheralRef};
use fixed::types::U24F8;
use platform::{LinkError, PanelLink, StreamConfig, PANEL_BUFFER_WORDS};

/// State machine clock divider.
pub const CLOCK_DIVIDER: u16 = 10;

/// The panel timing program's pins, already handed to PIO0.
pub struct PanelPins<'d> {
    /// Vertical sync
    pub vs: Pin<'d, PIO0>,
    /// Horizontal sync
    pub hs: Pin<'d, PIO0>,
    /// Pixel clock
    pub vclk: Pin<'d, PIO0>,
    /// Pixel data
    pub vid: Pin<'d, PIO0>,
}

/// [`PanelLink`] over PIO0 SM0 and one DMA channel.
pub struct PioPanelLink<'d, C: Channel> {
    _common: Common<'d, PIO0>,
    sm: StateMachine<'d, PIO0, 0>,
    dma: PeripheralRef<'d, C>,
    running: bool,
}

impl<'d, C: Channel> PioPanelLink<'d, C> {
    /// Load the timing program, configure SM0 and start it.
    pub fn new(
        mut common: Common<'d, PIO0>,
        mut sm: StateMachine<'d, PIO0, 0>,
        dma: impl Peripheral<P = C> + 'd,
        pins: PanelPins<'d>,
    ) -> Self {
        let prg = pio_proc::pio_asm!(
            ".side_set 1 opt",
            ".wrap_target",
            "    out x, 16",
            "    out y, 16",
            "    mov isr, x",
            "    set pins, 0b01",
            "row:",
            "    mov x, isr",
            "pixel:",
            "    out pins, 1 side 1",
            "    jmp x-- pixel side 0",
            "    set pins, 0b10",
            "    set pins, 0b00 [2]",
            "    jmp y-- row",
            ".wrap",
        );

        let mut cfg = Config::default();
        cfg.use_program(&common.load_program(&prg.program), &[&pins.vclk]);
        cfg.set_set_pins(&[&pins.vs, &pins.hs]);
        cfg.set_out_pins(&[&pins.vid]);
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 32,
            direction: ShiftDirection::Right,
        };
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.clock_divider = U24F8::from_num(CLOCK_DIVIDER);

        sm.set_pin_dirs(Direction::Out, &[&pins.vs, &pins.hs, &pins.vclk, &pins.vid]);
        sm.set_config(&cfg);
        sm.set_enable(true);

        let stream = StreamConfig::panel();
        defmt::info!(
            "panel link up: DREQ {=u8}, {=u32} words per burst",
            stream.dreq.dreq(),
            stream.transfer_count
        );

        Self {
            _common: common,
            sm,
            dma: dma.into_ref(),
            running: true,
        }
    }

    /// Stop the state machine. Subsequent link calls fail with
    /// [`LinkError::NotRunning`].
    pub fn stop(&mut self) {
        self.sm.set_enable(false);
        self.running = false;
    }
}

impl<C: Channel> PanelLink for PioPanelLink<'_, C> {
    async fn send_header(&mut self, header: u32) -> Result<(), LinkError> {
        if !self.running {
            return Err(LinkError::NotRunning);
        }
        self.sm.tx().wait_push(header).await;
        Ok(())
    }

    async fn stream_frame(&mut self, words: &[u32]) -> Result<(), LinkError> {
        if !self.running {
            return Err(LinkError::NotRunning);
        }
        if words.len() != PANEL_BUFFER_WORDS {
            return Err(LinkError::Length);
        }
        // Resolves from the DMA_IRQ_0 completion interrupt.
        self.sm.tx().dma_push(self.dma.reborrow(), words).await;
        Ok(())
    }
}

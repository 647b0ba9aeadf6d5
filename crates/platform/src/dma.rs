//! DMA abstraction layer
//!
//! Describes the single panel stream: fixed-size word transfers, incrementing
//! read address, constant write address (the timing generator's TX FIFO),
//! paced by the FIFO's data request and raising a completion interrupt.

use crate::panel::PANEL_BUFFER_WORDS;

/// Width of one DMA transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferSize {
    /// 8-bit transfers
    Byte,
    /// 16-bit transfers
    HalfWord,
    /// 32-bit transfers
    Word,
}

/// Peripheral data request that paces the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRequest {
    /// TX FIFO of a PIO state machine (`pio` block, `sm` index).
    PioTx {
        /// PIO block (0 or 1)
        pio: u8,
        /// State machine (0..=3)
        sm: u8,
    },
}

impl DataRequest {
    /// RP2040 DREQ number (`DREQ_PIOn_TXm = n * 8 + m`).
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // Safety: pio <= 1, sm <= 3 → result <= 11
    pub const fn dreq(self) -> u8 {
        match self {
            Self::PioTx { pio, sm } => pio * 8 + sm,
        }
    }
}

/// Channel configuration for one panel burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamConfig {
    /// Transfer width
    pub transfer_size: TransferSize,
    /// Increment the read address after each transfer
    pub read_increment: bool,
    /// Increment the write address after each transfer
    pub write_increment: bool,
    /// Pacing data request
    pub dreq: DataRequest,
    /// Transfers per burst
    pub transfer_count: u32,
    /// Raise the completion interrupt at the end of the burst
    pub irq_on_complete: bool,
}

impl StreamConfig {
    /// Configuration for streaming the panel buffer into PIO0 SM0.
    #[must_use]
    // PANEL_BUFFER_WORDS = 2570, fits in u32.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn panel() -> Self {
        Self {
            transfer_size: TransferSize::Word,
            read_increment: true,
            write_increment: false,
            dreq: DataRequest::PioTx { pio: 0, sm: 0 },
            transfer_count: PANEL_BUFFER_WORDS as u32,
            irq_on_complete: true,
        }
    }
}

/// Buffer that can be handed to a word-sized DMA stream.
pub trait DmaWords {
    /// The buffer viewed as 32-bit words.
    fn words(&self) -> &[u32];

    /// Number of words in the buffer
    fn word_len(&self) -> usize {
        self.words().len()
    }
}

impl<const N: usize> DmaWords for [u32; N] {
    fn words(&self) -> &[u32] {
        self
    }
}

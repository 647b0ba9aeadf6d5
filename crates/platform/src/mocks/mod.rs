//! Mock implementations for testing
//!
//! Host-side stand-ins for the panel hardware seam.

#![cfg(any(test, feature = "std"))]

use crate::display::{LinkError, PanelLink};
use crate::panel::PANEL_BUFFER_WORDS;

/// One recorded link operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOp {
    /// A header word was pushed.
    Header(u32),
    /// A burst of this many words was streamed; `checksum` is the wrapping
    /// sum of the words.
    Burst {
        /// Words in the burst
        len: usize,
        /// Wrapping sum of the words
        checksum: u32,
    },
}

/// Mock panel link that records operations and keeps the last streamed frame.
pub struct MockLink {
    ops: heapless::Vec<LinkOp, 64>,
    last_frame: std::vec::Vec<u32>,
    running: bool,
    fail_next_burst: bool,
}

impl MockLink {
    /// Create a running mock link
    pub fn new() -> Self {
        Self {
            ops: heapless::Vec::new(),
            last_frame: std::vec::Vec::new(),
            running: true,
            fail_next_burst: false,
        }
    }

    /// Create a link whose timing generator was never started
    pub fn stopped() -> Self {
        Self {
            running: false,
            ..Self::new()
        }
    }

    /// Make the next `stream_frame` fail with [`LinkError::Busy`]
    pub fn fail_next_burst(&mut self) {
        self.fail_next_burst = true;
    }

    /// Recorded operations, oldest first
    pub fn ops(&self) -> &[LinkOp] {
        &self.ops
    }

    /// Words of the most recent burst
    pub fn last_frame(&self) -> &[u32] {
        &self.last_frame
    }

    fn record(&mut self, op: LinkOp) {
        // Keep the most recent history when the log is full.
        if self.ops.is_full() {
            self.ops.remove(0);
        }
        let _ = self.ops.push(op);
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelLink for MockLink {
    async fn send_header(&mut self, header: u32) -> Result<(), LinkError> {
        if !self.running {
            return Err(LinkError::NotRunning);
        }
        self.record(LinkOp::Header(header));
        Ok(())
    }

    async fn stream_frame(&mut self, words: &[u32]) -> Result<(), LinkError> {
        if !self.running {
            return Err(LinkError::NotRunning);
        }
        if core::mem::take(&mut self.fail_next_burst) {
            return Err(LinkError::Busy);
        }
        if words.len() != PANEL_BUFFER_WORDS {
            return Err(LinkError::Length);
        }
        let checksum = words.iter().fold(0u32, |acc, w| acc.wrapping_add(*w));
        self.record(LinkOp::Burst {
            len: words.len(),
            checksum,
        });
        self.last_frame.clear();
        self.last_frame.extend_from_slice(words);
        Ok(())
    }
}

//! Demo frame producer for core 0.
//!
//! Stands in for the game: draws a moving pattern into the bank that is not
//! on screen, submits it, and now and then asks for a palette flash or a
//! screen melt so every display path is exercised on the bench.
//!
//! Only the top [`ANIMATED_ROWS`] of a bank are redrawn. The rows below hold
//! the static status bar, which the refresh side reads from the *other* bank
//! while the producer draws, so the two never touch the same bytes.
//!
//! A melt reads both banks: the old frame and the status rows under it. While
//! one runs the producer draws nothing and keeps resubmitting the new bank,
//! and flips banks again only after a plain frame has replaced the last wipe
//! frame on screen.

use platform::{
    FRAME_BANK_BYTES, MAIN_VIEWHEIGHT, SCREENHEIGHT, SCREENWIDTH, STATUS_BAR_SOURCE_SHIFT,
};
use scanout::{Bank, FrameBanks, FrameDescriptor, FrameHandoff, VideoMode, WipeStart};

use crate::resources::HUD_OVERLAYS;

/// Rows redrawn every frame.
pub const ANIMATED_ROWS: usize = MAIN_VIEWHEIGHT - STATUS_BAR_SOURCE_SHIFT;

/// Frames between melts.
pub const WIPE_PERIOD: u32 = 350;

/// Frames submitted in wipe mode per melt. The slowest column waits 30
/// frames, needs 8 to leave the slow rows and 45 more at 4 rows a frame.
pub const WIPE_FRAMES: u8 = 96;

/// Frames between palette flashes.
pub const FLASH_PERIOD: u32 = 105;

/// Frames a flash palette stays up.
pub const FLASH_FRAMES: u8 = 6;

/// Highest flash palette (1..=8 damage red, 9..=12 bonus gold).
const LAST_FLASH: u8 = 12;

/// Line lookup of the old frame per bank, status bar rows included.
#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing, clippy::arithmetic_side_effects)] // const loop; offsets < 2 banks
pub static WIPE_LOOKUP: [[u32; SCREENHEIGHT]; 2] = {
    let mut table = [[0u32; SCREENHEIGHT]; 2];
    let mut b = 0;
    while b < 2 {
        let old = Bank::from_index(b as u8);
        let mut r = 0;
        while r < SCREENHEIGHT {
            let offset = if r < MAIN_VIEWHEIGHT {
                FrameBanks::line_offset(old, r)
            } else {
                FrameBanks::line_offset(old.other(), r - STATUS_BAR_SOURCE_SHIFT)
            };
            table[b][r] = offset as u32;
            r += 1;
        }
        b += 1;
    }
    table
};

/// Per-scanline scroll values for the wobble phase.
#[allow(clippy::cast_possible_truncation, clippy::indexing_slicing, clippy::arithmetic_side_effects)] // const loop
static SCROLL: [u8; SCREENHEIGHT] = {
    let mut table = [0u8; SCREENHEIGHT];
    let mut r = 0;
    while r < SCREENHEIGHT {
        table[r] = ((r * 8) % 256) as u8;
        r += 1;
    }
    table
};

/// What the next submission carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// Frame to submit
    pub descriptor: FrameDescriptor,
    /// Palette to request with it
    pub palette: Option<u8>,
    /// Start a melt from the previous frame
    pub start_wipe: bool,
}

/// Pattern generator and submission schedule.
pub struct DemoProducer {
    frame: u32,
    bank: Bank,
    rng: u32,
    flash_left: u8,
    next_flash: u8,
    wipe_left: u8,
    melting: bool,
}

impl DemoProducer {
    /// Start at frame 0 drawing bank 0.
    pub const fn new(seed: u32) -> Self {
        Self {
            frame: 0,
            bank: Bank::Zero,
            rng: seed,
            flash_left: 0,
            next_flash: 1,
            wipe_left: 0,
            melting: false,
        }
    }

    /// Bank the next frame is drawn into.
    pub fn bank(&self) -> Bank {
        self.bank
    }

    /// The last submission was a wipe frame, so both banks may still be on
    /// screen and neither may be drawn into.
    pub fn melting(&self) -> bool {
        self.melting
    }

    /// Frames submitted so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Fill the status bar rows of one bank. Done once per bank at start-up.
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)] // x < 320, y < 32
    pub fn draw_status(bank: &mut [u8]) {
        let rows = bank
            .get_mut(ANIMATED_ROWS * SCREENWIDTH..FRAME_BANK_BYTES)
            .unwrap_or(&mut []);
        for (y, row) in rows.chunks_exact_mut(SCREENWIDTH).enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = if y == 0 || y == STATUS_BAR_SOURCE_SHIFT - 1 {
                    255
                } else {
                    (x * 255 / (SCREENWIDTH - 1)) as u8 & 0xF0
                };
            }
        }
    }

    /// Draw the animated rows of the current frame.
    #[allow(clippy::cast_possible_truncation)] // pattern values wrap mod 256
    pub fn draw(&self, bank: &mut [u8]) {
        let phase = self.frame.wrapping_mul(3) as u8;
        let rows = bank.get_mut(..ANIMATED_ROWS * SCREENWIDTH).unwrap_or(&mut []);
        for (y, row) in rows.chunks_exact_mut(SCREENWIDTH).enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = (x as u8).wrapping_add(phase) ^ (y as u8);
            }
        }
    }

    /// Decide the next submission and advance the schedule.
    pub fn plan(&mut self) -> FramePlan {
        let mut palette = (self.frame == 0).then_some(0);

        if self.flash_left > 0 {
            self.flash_left = self.flash_left.saturating_sub(1);
            if self.flash_left == 0 {
                palette = Some(0);
            }
        } else if self.frame % FLASH_PERIOD == FLASH_PERIOD / 2 {
            palette = Some(self.next_flash);
            self.flash_left = FLASH_FRAMES;
            self.next_flash = if self.next_flash >= LAST_FLASH {
                1
            } else {
                self.next_flash.saturating_add(1)
            };
        }

        let mut start_wipe = false;
        let mode = if self.wipe_left > 0 {
            self.wipe_left = self.wipe_left.saturating_sub(1);
            VideoMode::Wipe
        } else if self.frame > 0 && self.frame % WIPE_PERIOD == 0 {
            start_wipe = true;
            self.wipe_left = WIPE_FRAMES.saturating_sub(1);
            VideoMode::Wipe
        } else {
            VideoMode::Single
        };

        let wobble = mode == VideoMode::Single && (self.frame / 64) % 4 == 3;
        FramePlan {
            descriptor: FrameDescriptor {
                bank: self.bank,
                mode,
                overlay_index: HUD_OVERLAYS,
                scroll: wobble.then_some(SCROLL.as_slice()),
            },
            palette,
            start_wipe,
        }
    }

    fn next_random(&mut self) -> u32 {
        self.rng = self.rng.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.rng >> 16
    }

    /// Staggered column delays for a melt away from `old`: the first column
    /// waits up to 15 frames, each next one differs by at most one.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::arithmetic_side_effects)] // values < 16
    pub fn melt_from(&mut self, old: Bank) -> WipeStart {
        let mut raw = [0i16; SCREENWIDTH];
        let mut delay = -((self.next_random() % 16) as i16);
        for column in &mut raw {
            *column = delay;
            let step = (self.next_random() % 3) as i16 - 1;
            delay = delay.saturating_add(step).clamp(-15, 0);
        }
        let line_lookup: &'static [u32] = match WIPE_LOOKUP.get(old.index()) {
            Some(table) => table,
            None => &[],
        };
        WipeStart { raw, line_lookup }
    }

    /// Publish the next frame: palette and melt requests first, then the
    /// frame itself, waiting while two frames are in flight.
    ///
    /// Banks flip after plain frames only, so a melt keeps presenting the
    /// bank it started with.
    pub async fn submit(&mut self, handoff: &FrameHandoff) -> FrameDescriptor {
        let plan = self.plan();
        if let Some(index) = plan.palette {
            handoff.request_palette(index);
        }
        if plan.start_wipe {
            let start = self.melt_from(self.bank.other());
            handoff.request_wipe(start);
        }
        handoff.submit_frame(plan.descriptor).await;
        self.melting = plan.descriptor.mode == VideoMode::Wipe;
        if !self.melting {
            self.bank = self.bank.other();
        }
        self.frame = self.frame.wrapping_add(1);
        plan.descriptor
    }
}

/// Producer task (hardware target only).
///
/// Waits for core 1, seals start-up allocation, then submits frames at
/// [`platform::config::PRODUCER_FRAME_HZ`].
#[cfg(feature = "hardware")]
#[embassy_executor::task]
pub async fn producer_task(
    handoff: &'static FrameHandoff,
    banks: &'static crate::shared::SharedFrameBanks,
    launch: &'static crate::boot::CoreLaunch,
) {
    use embassy_time::{Duration, Ticker, Timer};
    use platform::config::PRODUCER_FRAME_HZ;

    launch.wait_launched().await;
    if let Err(e) = launch.seal() {
        defmt::error!("seal failed: {}", e);
    }
    defmt::info!("core 1 launched, producing at {=u64} Hz", PRODUCER_FRAME_HZ);

    let mut producer = DemoProducer::new(0x1D00_D15C);
    let mut ticker = Ticker::every(Duration::from_hz(PRODUCER_FRAME_HZ));
    loop {
        // Draw only once the last submission is on screen: the other bank
        // is then free.
        while handoff.queued() > 0 {
            Timer::after_millis(1).await;
        }
        if !producer.melting() {
            // SAFETY: nothing is queued and no melt is on screen, so the
            // refresh side shows the last bank submitted and `producer.bank()`
            // is the other one. Only its animated rows are written; the
            // refresh side reads just its status rows.
            let bank = unsafe { banks.bank_mut(producer.bank()) };
            producer.draw(bank);
        }
        let frame = producer.submit(handoff).await;
        if frame.mode == VideoMode::Wipe && producer.frame() % 10 == 0 {
            defmt::debug!("wipe frame {=u32}", producer.frame());
        }
        ticker.next().await;
    }
}

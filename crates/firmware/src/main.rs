//! EL Panel Scan-out Firmware - Main Entry Point
//!
//! Hardware-only entry point for the RP2040. Core 0 runs the producer on a
//! thread executor; core 1 owns the panel and runs the refresh task on an
//! interrupt executor bound to SWI_IRQ_5.
//!
//! See `firmware::boot::BOOT_SEQUENCE_STEPS` for the ordered start-up.

#![no_std]
#![no_main]

use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::multicore::{spawn_core1, Stack};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use platform::config::{boot_banner, APP_NAME, APP_VERSION, TARGET_CHIP};
use platform::PANEL_HEADER;
use scanout::{Bank, DisplayContext, FrameHandoff};
use static_cell::{ConstStaticCell, StaticCell};

use firmware::display::task::refresh_task;
use firmware::display::{PanelPins, PioPanelLink};
use firmware::producer::producer_task;
use firmware::{BuiltinResources, CoreLaunch, DemoProducer, SharedFrameBanks};

// Logging transport and panic handler
use defmt_rtt as _;
use panic_probe as _;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// Core 1 stack size in bytes.
const CORE1_STACK_BYTES: usize = 8192;

static HANDOFF: FrameHandoff = FrameHandoff::new();
static FRAME_BANKS: SharedFrameBanks = SharedFrameBanks::new();
static LAUNCH: CoreLaunch = CoreLaunch::new();
static RESOURCES: BuiltinResources = BuiltinResources::new();

static DISPLAY_CONTEXT: ConstStaticCell<DisplayContext> = ConstStaticCell::new(DisplayContext::new());
static CORE1_STACK: ConstStaticCell<Stack<CORE1_STACK_BYTES>> = ConstStaticCell::new(Stack::new());
static EXECUTOR_PRODUCER: StaticCell<Executor> = StaticCell::new();
static EXECUTOR_REFRESH: InterruptExecutor = InterruptExecutor::new();

/// Deferred refresh context: the refresh task's executor runs here.
#[interrupt]
unsafe fn SWI_IRQ_5() {
    // SAFETY: called only from the SWI_IRQ_5 vector, which the executor
    // owns after `start`.
    unsafe { EXECUTOR_REFRESH.on_interrupt() }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    defmt::info!("{=str} v{=str}", APP_NAME, APP_VERSION);
    defmt::info!("{=str} on {=str}", boot_banner(), TARGET_CHIP);

    // Step 1: clocks and peripherals; the DMA interrupt belongs to core 1.
    let p = embassy_rp::init(Default::default());
    firmware::boot::hw::release_dma_irq();

    // Static status bar rows in both banks, before either core draws.
    for bank in [Bank::Zero, Bank::One] {
        // SAFETY: core 1 is not running yet and no producer exists.
        DemoProducer::draw_status(unsafe { FRAME_BANKS.bank_mut(bank) });
    }

    // Step 2: core 1 claims the panel hardware.
    defmt::info!("spawning core 1");
    let pio0 = p.PIO0;
    let dma = p.DMA_CH0;
    let (vs, hs, vclk, vid) = (p.PIN_16, p.PIN_17, p.PIN_18, p.PIN_19);
    let (refresh_pin, complete_pin) = (p.PIN_14, p.PIN_15);

    spawn_core1(p.CORE1, CORE1_STACK.take(), move || {
        debug_assert!(LAUNCH.allocation_allowed());

        // Step 3: PIO0 SM0, DMA channel, panel pins.
        let Pio {
            mut common, sm0, ..
        } = Pio::new(pio0, Irqs);
        let pins = PanelPins {
            vs: common.make_pio_pin(vs),
            hs: common.make_pio_pin(hs),
            vclk: common.make_pio_pin(vclk),
            vid: common.make_pio_pin(vid),
        };
        let link: PioPanelLink<'static, _> = PioPanelLink::new(common, sm0, dma, pins);
        let refresh_pin = Output::new(refresh_pin, Level::Low);
        let complete_pin = Output::new(complete_pin, Level::Low);
        defmt::info!("panel header {=u32:#x}", PANEL_HEADER);

        // Step 4: completion interrupt above the deferred refresh context.
        firmware::boot::hw::claim_dma_irq();
        interrupt::SWI_IRQ_5.set_priority(Priority::P3);
        let spawner = EXECUTOR_REFRESH.start(interrupt::SWI_IRQ_5);

        let ctx = DISPLAY_CONTEXT.take();
        spawner.must_spawn(refresh_task(
            link,
            ctx,
            refresh_pin,
            complete_pin,
            &HANDOFF,
            &FRAME_BANKS,
            &RESOURCES,
        ));

        // Step 5: tell core 0 the panel is ours.
        LAUNCH.signal_launched();
        defmt::info!("core 1 launched");

        loop {
            cortex_m::asm::wfi();
        }
    });

    // Steps 6-7: the producer waits for core 1, seals and runs.
    let executor = EXECUTOR_PRODUCER.init(Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(producer_task(&HANDOFF, &FRAME_BANKS, &LAUNCH));
    })
}

//! WAV player firmware - main entry point
//!
//! Hardware-only entry point for the STM32H743ZI.

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_stm32::gpio::{AnyPin, Input, Level, Output, Pin, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::Hertz;
use embassy_time::{Delay, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;

use firmware::boot::{build_embassy_config, SD_INIT_SPI_HZ};
use firmware::display::LineConsole;
use firmware::input::buttons::DEBOUNCE_MS;
use firmware::input::ButtonPanel;
use firmware::sdcard::{self, Track, Volume};
use firmware::timers::{self, BasicTimer};
use firmware::{PlayerCell, PortDac};
use platform::config::{app_title, APP_VERSION};
use playback::{PlaybackConfig, PlaybackEngine};
use ui::Controller;

/// Keypad poll interval while no button is held.
const POLL_INTERVAL_MS: u64 = 5;

static PLAYER: PlayerCell<Track, BasicTimer, BasicTimer, PortDac> = PlayerCell::new();
static VOLUME: StaticCell<Volume> = StaticCell::new();

#[interrupt]
fn TIM7() {
    timers::acknowledge(embassy_stm32::pac::TIM7);
    PLAYER.on_sample_tick();
}

#[interrupt]
fn TIM6_DAC() {
    timers::acknowledge(embassy_stm32::pac::TIM6);
    PLAYER.on_refill_tick();
}

fn output(pin: AnyPin) -> Output<'static, AnyPin> {
    Output::new(pin, Level::Low, Speed::VeryHigh)
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    defmt::info!("{=str} v{=str}", app_title(), APP_VERSION);
    let p = embassy_stm32::init(build_embassy_config());

    // R-2R ladder on PD0..PD7.
    let dac = PortDac::new([
        output(p.PD0.degrade()),
        output(p.PD1.degrade()),
        output(p.PD2.degrade()),
        output(p.PD3.degrade()),
        output(p.PD4.degrade()),
        output(p.PD5.degrade()),
        output(p.PD6.degrade()),
        output(p.PD7.degrade()),
    ]);
    let engine = PlaybackEngine::new(
        BasicTimer::sample_clock(),
        BasicTimer::refill_clock(),
        dac,
        PlaybackConfig::default(),
    );
    if PLAYER.install(engine).is_err() {
        defmt::panic!("player installed twice");
    }

    // SD card on SPI1, identification at 400 kHz.
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = Hertz(SD_INIT_SPI_HZ);
    let spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config);
    let cs = Output::new(p.PA4.degrade(), Level::High, Speed::VeryHigh);
    let device = match ExclusiveDevice::new(spi, cs, Delay) {
        Ok(device) => device,
        Err(_) => defmt::panic!("SD chip select unusable"),
    };
    let card = match sdcard::init_card(device) {
        Ok(card) => card,
        Err(err) => defmt::panic!("SD card init failed: {}", defmt::Debug2Format(&err)),
    };
    let volume: &'static Volume = VOLUME.init(sdcard::volume_manager(card));
    let storage = match sdcard::mount(volume) {
        Ok(storage) => storage,
        Err(err) => defmt::panic!("mount failed: {}", defmt::Debug2Format(&err)),
    };

    let buttons = ButtonPanel::new(
        Input::new(p.PC0.degrade(), Pull::Up),
        Input::new(p.PC1.degrade(), Pull::Up),
        Input::new(p.PC2.degrade(), Pull::Up),
    );
    let console = LineConsole::new(|line: &str| defmt::println!("{=str}", line));

    menu(Controller::new(PLAYER.handle(), storage, console), buttons).await
}

async fn menu<P, S, D>(mut controller: Controller<P, S, D>, mut buttons: ButtonPanel<Input<'static, AnyPin>>) -> !
where
    S: platform::Storage,
    S::Error: core::fmt::Debug,
    P: playback::PlayerControl<File = S::File>,
    D: platform::TextDisplay,
{
    if let Err(err) = controller.show_directory() {
        defmt::warn!("listing failed: {}", defmt::Debug2Format(&err));
    }
    defmt::info!("Entering menu loop");
    loop {
        match controller.run_once(&mut buttons) {
            Ok(Some(_)) => Timer::after_millis(u64::from(DEBOUNCE_MS)).await,
            Ok(None) => Timer::after_millis(POLL_INTERVAL_MS).await,
            Err(err) => {
                defmt::warn!("menu error: {}", defmt::Debug2Format(&err));
                Timer::after_millis(u64::from(DEBOUNCE_MS)).await;
            }
        }
    }
}

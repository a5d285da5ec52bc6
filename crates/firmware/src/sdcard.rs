//! SD card on SPI1, mounted through `platform::storage_sdmmc`.
//!
//! | Signal | MCU pin |
//! |--------|---------|
//! | SCK    | PA5     |
//! | MISO   | PA6     |
//! | MOSI   | PA7     |
//! | CS     | PA4     |

use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::SPI1;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{SdCard, TimeSource, Timestamp, VolumeManager};
use platform::storage_sdmmc::{SdmmcError, SdmmcFile, SdmmcStorage, SharedVolumeManager};

use crate::boot::SD_SPI_HZ;

/// SPI1 with its chip select.
pub type CardSpi = ExclusiveDevice<Spi<'static, SPI1, NoDma, NoDma>, Output<'static, AnyPin>, Delay>;
/// The card as a block device.
pub type Card = SdCard<CardSpi, Delay>;
/// Volume manager shared with the refill interrupt.
pub type Volume = SharedVolumeManager<Card, FixedClock>;
/// The mounted volume.
pub type CardStorage = SdmmcStorage<'static, Card, FixedClock>;
/// An open track.
pub type Track = SdmmcFile<'static, Card, FixedClock>;

/// Timestamps for the filesystem. The volume is only read, so a fixed
/// date never reaches the card.
pub struct FixedClock;

impl TimeSource for FixedClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 56,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

/// Initialize the card (the SPI bus must run at 400 kHz), then switch the
/// bus to [`SD_SPI_HZ`].
pub fn init_card(device: CardSpi) -> Result<Card, embedded_sdmmc::SdCardError> {
    let card = SdCard::new(device, Delay);
    let bytes = card.num_bytes()?;
    defmt::info!("SD card: {=u64} MiB", bytes.checked_shr(20).unwrap_or(0));
    let mut fast = spi::Config::default();
    fast.frequency = Hertz(SD_SPI_HZ);
    card.spi(|device| {
        if device.bus_mut().set_config(&fast).is_err() {
            defmt::warn!("SD card: keeping the identification clock");
        }
    });
    Ok(card)
}

/// Wrap `card` in a volume manager.
pub fn volume_manager(card: Card) -> Volume {
    embassy_sync::blocking_mutex::Mutex::new(VolumeManager::new_with_limits(card, FixedClock, 0))
}

/// Mount the first partition.
pub fn mount(volume: &'static Volume) -> Result<CardStorage, SdmmcError<embedded_sdmmc::SdCardError>> {
    SdmmcStorage::mount(volume)
}

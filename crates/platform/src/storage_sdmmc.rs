//! SD card Storage implementation on top of `embedded-sdmmc`.
//!
//! The FAT volume manager is shared between the foreground (directory
//! listing, opening tracks) and the refill interrupt (reading the open
//! track), so it sits behind a critical-section mutex. Every call holds the
//! lock for exactly one volume-manager operation.

use core::fmt::Write as _;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_sdmmc::{BlockDevice, Mode, RawDirectory, RawFile, RawVolume, TimeSource, VolumeIdx, VolumeManager};

use crate::config::PATH_SEPARATOR;
use crate::storage::{DirEntry, File, Storage};

/// Open directories the volume manager may track at once.
pub const MAX_DIRS: usize = 4;
/// Open files the volume manager may track at once.
pub const MAX_FILES: usize = 2;

/// A volume manager shared between thread mode and interrupts.
pub type SharedVolumeManager<D, T> = Mutex<CriticalSectionRawMutex, VolumeManager<D, T, MAX_DIRS, MAX_FILES, 1>>;

/// Errors from the SD card backend.
#[derive(Debug)]
pub enum SdmmcError<E: core::fmt::Debug> {
    /// Filesystem or block device failure
    Fs(embedded_sdmmc::Error<E>),
    /// Path component is not a valid 8.3 name
    InvalidPath,
}

impl<E: core::fmt::Debug> From<embedded_sdmmc::Error<E>> for SdmmcError<E> {
    fn from(err: embedded_sdmmc::Error<E>) -> Self {
        Self::Fs(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for SdmmcError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fs(err) => write!(f, "SD filesystem error: {err:?}"),
            Self::InvalidPath => f.write_str("invalid path"),
        }
    }
}

/// FAT volume on an SD card.
pub struct SdmmcStorage<'a, D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    manager: &'a SharedVolumeManager<D, T>,
    volume: RawVolume,
}

impl<'a, D, T> SdmmcStorage<'a, D, T>
where
    D: BlockDevice,
    T: TimeSource,
    D::Error: core::fmt::Debug,
{
    /// Mount the first partition of the card.
    pub fn mount(manager: &'a SharedVolumeManager<D, T>) -> Result<Self, SdmmcError<D::Error>> {
        let volume = manager.lock(|vm| vm.open_raw_volume(VolumeIdx(0)))?;
        Ok(Self { manager, volume })
    }

    /// Walk `path` from the root and return the innermost directory. The
    /// caller owns (and must close) the returned handle.
    fn open_path(&self, path: &str) -> Result<RawDirectory, SdmmcError<D::Error>> {
        self.manager.lock(|vm| {
            let mut dir = vm.open_root_dir(self.volume)?;
            for component in path.split(PATH_SEPARATOR).filter(|c| !c.is_empty()) {
                let next = vm.open_dir(dir, component);
                vm.close_dir(dir)?;
                dir = next?;
            }
            Ok(dir)
        })
    }
}

impl<'a, D, T> Storage for SdmmcStorage<'a, D, T>
where
    D: BlockDevice,
    T: TimeSource,
    D::Error: core::fmt::Debug,
{
    type Error = SdmmcError<D::Error>;
    type File = SdmmcFile<'a, D, T>;

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let (parent, name) = path.rsplit_once(PATH_SEPARATOR).unwrap_or(("", path));
        if name.is_empty() {
            return Err(SdmmcError::InvalidPath);
        }
        let dir = self.open_path(parent)?;
        let opened = self.manager.lock(|vm| {
            let file = vm.open_file_in_dir(dir, name, Mode::ReadOnly);
            vm.close_dir(dir)?;
            let file = file?;
            match vm.file_length(file) {
                Ok(size) => Ok((file, size)),
                Err(err) => {
                    let _ = vm.close_file(file);
                    Err(err)
                }
            }
        });
        let (raw, size) = opened?;
        Ok(SdmmcFile {
            manager: self.manager,
            raw,
            size: u64::from(size),
            eof: size == 0,
        })
    }

    fn read_dir<V>(&mut self, path: &str, mut visit: V) -> Result<(), Self::Error>
    where
        V: FnMut(&DirEntry),
    {
        let dir = self.open_path(path)?;
        self.manager.lock(|vm| {
            let listed = vm.iterate_dir(dir, |entry| {
                if entry.attributes.is_volume() {
                    return;
                }
                let mut name: heapless::String<16> = heapless::String::new();
                if write!(name, "{}", entry.name).is_err() || name == "." || name == ".." {
                    return;
                }
                let is_dir = entry.attributes.is_directory();
                let size = if is_dir { 0 } else { u64::from(entry.size) };
                if let Some(dir_entry) = DirEntry::new(&name, is_dir, size) {
                    visit(&dir_entry);
                }
            });
            vm.close_dir(dir)?;
            listed
        })?;
        Ok(())
    }
}

/// Open file on the SD card. Closed when dropped.
pub struct SdmmcFile<'a, D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    manager: &'a SharedVolumeManager<D, T>,
    raw: RawFile,
    size: u64,
    eof: bool,
}

impl<D, T> File for SdmmcFile<'_, D, T>
where
    D: BlockDevice,
    T: TimeSource,
    D::Error: core::fmt::Debug,
{
    type Error = SdmmcError<D::Error>;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.eof || buf.is_empty() {
            return Ok(0);
        }
        let (n, eof) = self.manager.lock(|vm| {
            let n = vm.read(self.raw, buf)?;
            Ok::<_, embedded_sdmmc::Error<D::Error>>((n, vm.file_eof(self.raw)?))
        })?;
        self.eof = eof;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        let clamped = u32::try_from(pos.min(self.size)).unwrap_or(u32::MAX);
        self.manager.lock(|vm| vm.file_seek_from_start(self.raw, clamped))?;
        self.eof = u64::from(clamped) >= self.size;
        Ok(u64::from(clamped))
    }

    fn is_eof(&self) -> bool {
        self.eof
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl<D, T> Drop for SdmmcFile<'_, D, T>
where
    D: BlockDevice,
    T: TimeSource,
{
    fn drop(&mut self) {
        // Nothing to report to on drop; a failed close leaks one handle slot.
        let _ = self.manager.lock(|vm| vm.close_file(self.raw));
    }
}

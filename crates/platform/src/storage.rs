//! Storage abstraction for the FAT volume
//!
//! All calls are blocking. The refill interrupt reads from a [`File`]
//! directly, so implementations must return within a bounded time and must
//! never wait on another task.
//!
//! A [`File`] releases its underlying handle when dropped; there is no
//! explicit close call to forget on an error path.

use heapless::String;

use crate::config::MAX_NAME_LEN;

/// Storage trait for file system access
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File;

    /// Open file for reading
    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error>;

    /// Call `visit` once for every entry of the directory at `path`, in the
    /// order the volume stores them. `.` and `..` are not reported.
    fn read_dir<V>(&mut self, path: &str, visit: V) -> Result<(), Self::Error>
    where
        V: FnMut(&DirEntry);
}

/// File trait for reading files
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from current position. Returns the number of bytes read, which is
    /// zero only at end of file or for an empty `buf`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Seek to an absolute position
    fn seek(&mut self, pos: u64) -> Result<u64, Self::Error>;

    /// `true` once the cursor has reached the end of the file
    fn is_eof(&self) -> bool;

    /// Get file size
    fn size(&self) -> u64;
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Entry name without any directory component.
    pub name: String<MAX_NAME_LEN>,
    /// `true` for sub-directories.
    pub is_dir: bool,
    /// File size in bytes (zero for directories).
    pub size: u64,
}

impl DirEntry {
    /// Build an entry, returning `None` when `name` does not fit in
    /// [`MAX_NAME_LEN`] bytes.
    pub fn new(name: &str, is_dir: bool, size: u64) -> Option<Self> {
        let mut owned = String::new();
        owned.push_str(name).ok()?;
        Some(Self {
            name: owned,
            is_dir,
            size,
        })
    }

    /// `true` when the name ends in `.wav` (any case).
    pub fn is_wav(&self) -> bool {
        !self.is_dir
            && self
                .name
                .rsplit_once('.')
                .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("wav"))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DirEntry {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str} dir={=bool} size={=u64}", self.name.as_str(), self.is_dir, self.size);
    }
}

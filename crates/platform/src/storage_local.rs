//! Local filesystem Storage implementation for host tools.
//!
//! `LocalFileStorage` implements `platform::Storage` using `std::fs`.
//! Used when the `std` feature is enabled (xtask simulation, tests).
//! All paths are resolved relative to the `root` provided at construction,
//! so `/music/a.wav` means `{root}/music/a.wav`.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use crate::storage::{DirEntry, File, Storage};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub struct LocalStorageError(pub std::io::Error);

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "local storage error: {}", self.0)
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
    pos: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = Read::read(&mut self.inner, buf).map_err(LocalStorageError)?;
        self.pos = self.pos.saturating_add(n as u64);
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        self.pos = Seek::seek(&mut self.inner, SeekFrom::Start(pos)).map_err(LocalStorageError)?;
        Ok(self.pos)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.size
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A `platform::Storage` implementation backed by `std::fs`.
///
/// # Example
/// ```no_run
/// use platform::storage_local::LocalFileStorage;
/// use platform::Storage;
/// let mut storage = LocalFileStorage::new("/home/user/music");
/// let file = storage.open_file("/song.wav").unwrap();
/// ```
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `root`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    /// Create from the `MUSIC_PATH` environment variable.
    ///
    /// Returns `None` if `MUSIC_PATH` is not set or is not valid UTF-8.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var("MUSIC_PATH").ok().map(|p| Self::new(&p))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type File = LocalFile;

    fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::File::open(&full).map_err(LocalStorageError)?;
        let meta = file.metadata().map_err(LocalStorageError)?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
            pos: 0,
        })
    }

    /// Entries are reported in name order so listings are stable across
    /// host filesystems. Names longer than the entry capacity are skipped.
    fn read_dir<V>(&mut self, path: &str, mut visit: V) -> Result<(), Self::Error>
    where
        V: FnMut(&DirEntry),
    {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path)).map_err(LocalStorageError)? {
            let entry = entry.map_err(LocalStorageError)?;
            let meta = entry.metadata().map_err(LocalStorageError)?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let size = if meta.is_dir() { 0 } else { meta.len() };
            if let Some(dir_entry) = DirEntry::new(name, meta.is_dir(), size) {
                entries.push(dir_entry);
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.iter().for_each(|e| visit(e));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::storage::{File, Storage};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn local_storage_read_full_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test.bin"), b"hello world").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open_file("/test.bin").unwrap();
        let mut buf = [0u8; 11];
        let n = file.read(&mut buf).unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
        assert!(file.is_eof());
    }

    #[test]
    fn local_storage_size_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("size.bin"), [0u8; 64]).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let file = storage.open_file("size.bin").unwrap();
        assert_eq!(file.size(), 64);
        assert!(!file.is_eof());
    }

    #[test]
    fn local_storage_seek_and_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("seek.bin"), b"ABCDEFGH").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open_file("/seek.bin").unwrap();
        assert_eq!(file.seek(4).unwrap(), 4);
        let mut buf = [0u8; 4];
        file.read(&mut buf).unwrap();
        assert_eq!(&buf, b"EFGH");
        assert!(file.is_eof());
    }

    #[test]
    fn local_storage_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());
        assert!(storage.open_file("/missing.wav").is_err());
    }

    #[test]
    fn local_storage_lists_directory_sorted() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.wav"), [0u8; 3]).unwrap();
        fs::write(tmp.path().join("a.wav"), [0u8; 5]).unwrap();
        fs::create_dir(tmp.path().join("album")).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().to_str().unwrap());

        let mut seen = Vec::new();
        storage
            .read_dir("/", |e| seen.push((e.name.to_string(), e.is_dir, e.size)))
            .unwrap();

        assert_eq!(
            seen,
            vec![
                ("a.wav".to_string(), false, 5),
                ("album".to_string(), true, 0),
                ("b.wav".to_string(), false, 3),
            ]
        );
    }
}

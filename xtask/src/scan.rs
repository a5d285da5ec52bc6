//! xtask scan: list the WAV files under a directory the way the menu would
//! see them, with their format and whether the player accepts them.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use playback::wav::{parse_header, WavHeader, HEADER_LEN};
use playback::HeaderError;
use walkdir::WalkDir;

/// One scanned file.
#[derive(Debug)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub header: Result<WavHeader, ScanError>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScanError {
    Header(HeaderError),
    Io(String),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl ScanEntry {
    pub fn is_playable(&self) -> bool {
        self.header.as_ref().is_ok_and(|h| h.format.is_playable())
    }
}

/// Entry point called from main.rs
pub fn run(dir: &Path) -> Result<()> {
    println!("Scanning: {}", dir.display());
    let entries = scan(dir)?;
    let playable = entries.iter().filter(|e| e.is_playable()).count();

    for entry in &entries {
        let rel = entry.path.strip_prefix(dir).unwrap_or(&entry.path);
        match &entry.header {
            Ok(h) => {
                let line = format!(
                    "  {:<40} {} ch {:>6} Hz {:>2} bit {:>10} bytes",
                    rel.display(),
                    h.format.channels,
                    h.format.sample_rate,
                    h.format.bits_per_sample,
                    h.data_size
                );
                if entry.is_playable() {
                    println!("{}", line.green());
                } else {
                    println!("{}", line.yellow());
                }
            }
            Err(e) => println!("{}", format!("  {:<40} {e}", rel.display()).red()),
        }
    }
    println!("Found {} WAV files, {} playable", entries.len(), playable);
    Ok(())
}

/// Walk `dir` and read the header of every `.wav` file, sorted by path.
pub fn scan(dir: &Path) -> Result<Vec<ScanEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_wav(entry.path()) {
            continue;
        }
        entries.push(ScanEntry {
            path: entry.path().to_path_buf(),
            header: read_header(entry.path()),
        });
    }
    Ok(entries)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

fn read_header(path: &Path) -> Result<WavHeader, ScanError> {
    let file = fs::File::open(path).map_err(|e| ScanError::Io(e.to_string()))?;
    let mut raw = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut raw)
        .map_err(|e| ScanError::Io(e.to_string()))?;
    parse_header(&raw).map_err(ScanError::Header)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use playback::wav::encode_header;
    use playback::AudioFormat;
    use tempfile::TempDir;

    fn write_wav(path: &Path, format: AudioFormat, data: &[u8]) {
        let mut bytes = encode_header(&format, u32::try_from(data.len()).unwrap()).to_vec();
        bytes.extend_from_slice(data);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_scan_finds_nested_wavs_in_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("album")).unwrap();
        write_wav(&dir.path().join("b.wav"), AudioFormat::mono_u8(8000), &[0x80; 10]);
        write_wav(&dir.path().join("album/a.WAV"), AudioFormat::mono_u8(11_025), &[0x80; 10]);
        fs::write(dir.path().join("notes.txt"), "not audio").unwrap();

        let entries = scan(dir.path()).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| e.path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("album/a.WAV"), PathBuf::from("b.wav")]);
        assert!(entries.iter().all(ScanEntry::is_playable));
    }

    #[test]
    fn test_scan_reports_unsupported_format() {
        let dir = TempDir::new().unwrap();
        let stereo = AudioFormat {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
        };
        write_wav(&dir.path().join("cd.wav"), stereo, &[0; 16]);

        let entries = scan(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_playable());
        assert_eq!(entries[0].header.as_ref().unwrap().format, stereo);
    }

    #[test]
    fn test_scan_reports_broken_header() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("short.wav"), b"RIFF").unwrap();

        let entries = scan(dir.path()).unwrap();
        assert_eq!(entries[0].header, Err(ScanError::Header(HeaderError::Truncated)));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(scan(dir.path()).unwrap().is_empty());
    }
}

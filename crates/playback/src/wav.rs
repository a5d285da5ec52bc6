//! Canonical 44-byte WAV header parsing.
//!
//! Only the fixed-offset layout written by common tools is understood: one
//! `fmt ` chunk at offset 12 followed directly by the `data` chunk. Fields:
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | `RIFF`           |
//! | 8      | 4    | `WAVE`           |
//! | 12     | 4    | `fmt `           |
//! | 22     | 2    | channels (LE)    |
//! | 24     | 4    | sample rate (LE) |
//! | 34     | 2    | bits per sample  |
//! | 40     | 4    | data size (LE)   |
//! | 44     | ...  | sample data      |
//!
//! The declared data size is informational; playback runs until the file
//! ends.

use platform::File;

/// Offset of the first sample byte.
pub const HEADER_LEN: usize = 44;

/// Channels, rate and sample width of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioFormat {
    /// Interleaved channel count
    pub channels: u16,
    /// Frames per second
    pub sample_rate: u32,
    /// Bits per sample per channel
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Mono 8-bit PCM at `sample_rate`.
    pub const fn mono_u8(sample_rate: u32) -> Self {
        Self {
            channels: 1,
            sample_rate,
            bits_per_sample: 8,
        }
    }

    /// `true` for the only layout the DAC path can play: mono, 8-bit.
    pub fn is_playable(&self) -> bool {
        self.channels == 1 && self.bits_per_sample == 8
    }
}

/// Which header field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// Fewer than 44 bytes available
    Truncated,
    /// No `RIFF` at offset 0
    NotRiff,
    /// No `WAVE` at offset 8
    NotWave,
    /// No `fmt ` chunk at offset 12
    MissingFmt,
}

impl core::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated => write!(f, "header shorter than {HEADER_LEN} bytes"),
            Self::NotRiff => write!(f, "missing RIFF marker"),
            Self::NotWave => write!(f, "missing WAVE marker"),
            Self::MissingFmt => write!(f, "missing fmt chunk"),
        }
    }
}

/// The header could not be read or is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError<E> {
    /// Storage read or seek failed
    Io(E),
    /// Header bytes are invalid
    Header(HeaderError),
}

impl<E> From<HeaderError> for FormatError<E> {
    fn from(err: HeaderError) -> Self {
        Self::Header(err)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for FormatError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "read error: {err:?}"),
            Self::Header(err) => write!(f, "bad WAV header: {err}"),
        }
    }
}

/// Decoded header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavHeader {
    /// Stream layout
    pub format: AudioFormat,
    /// Declared length of the data chunk
    pub data_size: u32,
}

fn field<const W: usize>(header: &[u8], offset: usize) -> Result<[u8; W], HeaderError> {
    header
        .get(offset..offset.saturating_add(W))
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(HeaderError::Truncated)
}

/// Parse the first [`HEADER_LEN`] bytes of a WAV file.
pub fn parse_header(header: &[u8]) -> Result<WavHeader, HeaderError> {
    if header.len() < HEADER_LEN {
        return Err(HeaderError::Truncated);
    }
    if &field::<4>(header, 0)? != b"RIFF" {
        return Err(HeaderError::NotRiff);
    }
    if &field::<4>(header, 8)? != b"WAVE" {
        return Err(HeaderError::NotWave);
    }
    if &field::<4>(header, 12)? != b"fmt " {
        return Err(HeaderError::MissingFmt);
    }
    Ok(WavHeader {
        format: AudioFormat {
            channels: u16::from_le_bytes(field(header, 22)?),
            sample_rate: u32::from_le_bytes(field(header, 24)?),
            bits_per_sample: u16::from_le_bytes(field(header, 34)?),
        },
        data_size: u32::from_le_bytes(field(header, 40)?),
    })
}

/// Build a canonical PCM header for `format` with `data_size` sample bytes.
#[allow(clippy::arithmetic_side_effects)] // u32 products of u16 fields, saturated below
pub fn encode_header(format: &AudioFormat, data_size: u32) -> [u8; HEADER_LEN] {
    let block_align = u32::from(format.channels) * u32::from(format.bits_per_sample).div_ceil(8);
    let byte_rate = format.sample_rate.saturating_mul(block_align);
    let mut out = [0u8; HEADER_LEN];
    let parts: [(usize, &[u8]); 13] = [
        (0, b"RIFF"),
        (4, &data_size.saturating_add(36).to_le_bytes()),
        (8, b"WAVE"),
        (12, b"fmt "),
        (16, &16u32.to_le_bytes()),
        (20, &1u16.to_le_bytes()),
        (22, &format.channels.to_le_bytes()),
        (24, &format.sample_rate.to_le_bytes()),
        (28, &byte_rate.to_le_bytes()),
        (32, &u16::try_from(block_align).unwrap_or(u16::MAX).to_le_bytes()),
        (34, &format.bits_per_sample.to_le_bytes()),
        (36, b"data"),
        (40, &data_size.to_le_bytes()),
    ];
    for (offset, bytes) in parts {
        if let Some(dst) = out.get_mut(offset..offset.saturating_add(bytes.len())) {
            dst.copy_from_slice(bytes);
        }
    }
    out
}

/// An open WAV file positioned at its sample data.
///
/// Dropping it drops (and so closes) the underlying file.
#[derive(Debug)]
pub struct WavFile<F> {
    file: F,
    header: WavHeader,
}

impl<F: File> WavFile<F> {
    /// Read and validate the header, then seek to the first sample.
    pub fn load(mut file: F) -> Result<Self, FormatError<F::Error>> {
        file.seek(0).map_err(FormatError::Io)?;
        let mut raw = [0u8; HEADER_LEN];
        let mut filled = 0;
        while let Some(rest) = raw.get_mut(filled..).filter(|r| !r.is_empty()) {
            match file.read(rest).map_err(FormatError::Io)? {
                0 => break,
                n => filled = filled.saturating_add(n),
            }
        }
        let header = parse_header(raw.get(..filled).unwrap_or_default())?;
        if file.seek(HEADER_LEN as u64).map_err(FormatError::Io)? != HEADER_LEN as u64 {
            return Err(HeaderError::Truncated.into());
        }
        Ok(Self { file, header })
    }

    /// Stream layout.
    pub fn format(&self) -> AudioFormat {
        self.header.format
    }

    /// Interleaved channel count.
    pub fn channels(&self) -> u16 {
        self.header.format.channels
    }

    /// Frames per second.
    pub fn sample_rate(&self) -> u32 {
        self.header.format.sample_rate
    }

    /// Bits per sample.
    pub fn bits_per_sample(&self) -> u16 {
        self.header.format.bits_per_sample
    }

    /// Declared data chunk length.
    pub fn data_size(&self) -> u32 {
        self.header.data_size
    }

    /// The file, positioned somewhere in the sample data.
    pub fn file_mut(&mut self) -> &mut F {
        &mut self.file
    }

    /// Give back the underlying file.
    pub fn into_inner(self) -> F {
        self.file
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::MockStorage;
    use platform::Storage;

    #[test]
    fn parses_mono_8_bit_header() {
        let header = encode_header(&AudioFormat::mono_u8(8000), 956);
        let parsed = parse_header(&header).unwrap();
        assert_eq!(parsed.format, AudioFormat::mono_u8(8000));
        assert_eq!(parsed.data_size, 956);
    }

    #[test]
    fn rejects_missing_markers() {
        let good = encode_header(&AudioFormat::mono_u8(8000), 0);
        let mut bad = good;
        bad[0] = b'X';
        assert_eq!(parse_header(&bad), Err(HeaderError::NotRiff));
        let mut bad = good;
        bad[8..12].copy_from_slice(b"AVI ");
        assert_eq!(parse_header(&bad), Err(HeaderError::NotWave));
        let mut bad = good;
        bad[12..16].copy_from_slice(b"LIST");
        assert_eq!(parse_header(&bad), Err(HeaderError::MissingFmt));
    }

    #[test]
    fn short_header_is_truncated() {
        let header = encode_header(&AudioFormat::mono_u8(8000), 0);
        assert_eq!(parse_header(&header[..43]), Err(HeaderError::Truncated));
    }

    #[test]
    fn stereo_16_bit_is_not_playable() {
        let format = AudioFormat {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
        };
        assert!(!format.is_playable());
        assert!(AudioFormat::mono_u8(22_050).is_playable());
    }

    #[test]
    fn load_stops_on_short_reads() {
        let mut storage = MockStorage::new();
        let mut bytes = encode_header(&AudioFormat::mono_u8(11_025), 3).to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        storage.add_file("/a.wav", &bytes);
        storage.limit_read_size("/a.wav", 10);

        let mut wav = WavFile::load(storage.open_file("/a.wav").unwrap()).unwrap();
        assert_eq!(wav.sample_rate(), 11_025);
        let mut rest = [0u8; 3];
        assert_eq!(wav.file_mut().read(&mut rest).unwrap(), 3);
        assert_eq!(rest, [1, 2, 3]);
    }

    #[test]
    fn load_reports_truncated_file() {
        let mut storage = MockStorage::new();
        storage.add_file("/short.wav", b"RIFF");
        let file = storage.open_file("/short.wav").unwrap();
        assert!(matches!(
            WavFile::load(file),
            Err(FormatError::Header(HeaderError::Truncated))
        ));
    }
}

//! The default package format.
//!
//! ```text
//! entry count: u32 LE
//! per entry (container order):
//!   name length:       u32 LE
//!   name:              UTF-8 bytes
//!   compressed length: u32 LE
//!   compressed:        gzip stream
//! ```

use std::io::Write;

use spak_types::ShaderPak;

use crate::compression::Compressor;
use crate::error::PakResult;
use crate::format::{FormatKind, PakFormat};
use crate::frame::{read_sequential, write_sequential, LengthEncoding, ReadSeek};

/// Simple sequential format with fixed-width length fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultPak {
    compressor: Compressor,
}

impl DefaultPak {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compressor(compressor: Compressor) -> Self {
        Self { compressor }
    }
}

impl PakFormat for DefaultPak {
    fn kind(&self) -> FormatKind {
        FormatKind::Default
    }

    fn write(&self, out: &mut dyn Write, pak: &ShaderPak) -> PakResult<()> {
        write_sequential(out, pak, &self.compressor, LengthEncoding::Fixed32)
    }

    fn read(&self, src: &mut dyn ReadSeek) -> PakResult<ShaderPak> {
        read_sequential(src, LengthEncoding::Fixed32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::decompress;
    use crate::error::PakError;

    fn sample() -> ShaderPak {
        [("vs_main", vec![1u8, 2, 3, 4]), ("ps_main", vec![])]
            .into_iter()
            .collect()
    }

    #[test]
    fn layout() {
        let bytes = DefaultPak::new().to_bytes(&sample()).unwrap();

        assert_eq!(&bytes[0..4], &2u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &7u32.to_le_bytes());
        assert_eq!(&bytes[8..15], b"vs_main");

        let clen = u32::from_le_bytes(bytes[15..19].try_into().unwrap()) as usize;
        assert_eq!(decompress(&bytes[19..19 + clen]).unwrap(), vec![1, 2, 3, 4]);

        let next = 19 + clen;
        assert_eq!(&bytes[next..next + 4], &7u32.to_le_bytes());
        assert_eq!(&bytes[next + 4..next + 11], b"ps_main");
    }

    #[test]
    fn empty_package() {
        let bytes = DefaultPak::new().to_bytes(&ShaderPak::new()).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(DefaultPak::new().from_bytes(&bytes).unwrap().is_empty());
    }

    #[test]
    fn roundtrip() {
        let pak = sample();
        let codec = DefaultPak::new();
        let bytes = codec.to_bytes(&pak).unwrap();
        assert_eq!(codec.from_bytes(&bytes).unwrap(), pak);
    }

    #[test]
    fn count_exceeds_entries() {
        let mut bytes = DefaultPak::new().to_bytes(&sample()).unwrap();
        bytes[0..4].copy_from_slice(&3u32.to_le_bytes());
        let err = DefaultPak::new().from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PakError::Truncated { .. }));
    }

    #[test]
    fn huge_declared_length() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(b"abc");
        let err = DefaultPak::new().from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PakError::LengthOutOfBounds { .. }));
    }

    #[test]
    fn truncated_payload() {
        let bytes = DefaultPak::new().to_bytes(&sample()).unwrap();
        let err = DefaultPak::new()
            .from_bytes(&bytes[..bytes.len() - 3])
            .unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn trailing_bytes() {
        let mut bytes = DefaultPak::new().to_bytes(&sample()).unwrap();
        bytes.push(0);
        let err = DefaultPak::new().from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, PakError::TrailingData { remaining: 1 }));
    }
}

//! Gzip block compression for shader payloads.
//!
//! Every payload is an independent single-member gzip stream; nothing is
//! shared between calls.

use std::io::{Read, Write};

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{PakError, PakResult};

/// Deflate level used when none is configured.
pub const DEFAULT_LEVEL: u32 = 6;

/// Compression algorithm tag stored in indexed package headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompressionKind {
    Gzip,
}

impl CompressionKind {
    /// Serialize to the header tag byte.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Gzip => 1,
        }
    }

    /// Parse a header tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Gzip),
            _ => None,
        }
    }
}

/// Gzip compressor with a fixed deflate level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Compressor {
    level: u32,
}

impl Compressor {
    /// Create a compressor; levels above 9 are clamped.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    /// Configured deflate level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Compress `data` into a standalone gzip stream.
    pub fn compress(&self, data: &[u8]) -> PakResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(
            Vec::with_capacity(data.len() / 2 + 32),
            Compression::new(self.level),
        );
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

/// Decompress one gzip stream back to the original bytes.
///
/// The block must hold exactly one gzip member; anything after it is
/// reported as corruption.
pub fn decompress(data: &[u8]) -> PakResult<Vec<u8>> {
    if data.is_empty() {
        return Err(PakError::CorruptBlock("empty compressed block".into()));
    }

    let mut decompressed = Vec::with_capacity(data.len().saturating_mul(3));
    let mut decoder = GzDecoder::new(data);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| PakError::CorruptBlock(e.to_string()))?;

    let rest = decoder.into_inner();
    if !rest.is_empty() {
        return Err(PakError::CorruptBlock(format!(
            "{} trailing bytes after gzip stream",
            rest.len()
        )));
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_roundtrip() {
        let compressed = Compressor::default().compress(&[]).unwrap();
        assert!(!compressed.is_empty());
        assert_eq!(decompress(&compressed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn repetitive_data_shrinks() {
        let data = vec![0xABu8; 100_000];
        let compressed = Compressor::default().compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn gzip_magic() {
        let compressed = Compressor::default().compress(b"shader").unwrap();
        assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
    }

    #[test]
    fn deterministic_output() {
        let c = Compressor::new(9);
        assert_eq!(c.compress(b"abcabc").unwrap(), c.compress(b"abcabc").unwrap());
    }

    #[test]
    fn level_clamped() {
        assert_eq!(Compressor::new(42).level(), 9);
        let stored = Compressor::new(0).compress(b"uncompressed").unwrap();
        assert_eq!(decompress(&stored).unwrap(), b"uncompressed");
    }

    #[test]
    fn truncated_stream_rejected() {
        let compressed = Compressor::default().compress(&[7u8; 1000]).unwrap();
        let err = decompress(&compressed[..compressed.len() - 4]).unwrap_err();
        assert!(matches!(err, PakError::CorruptBlock(_)));
    }

    #[test]
    fn garbage_rejected() {
        let err = decompress(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, PakError::CorruptBlock(_)));
        assert!(matches!(decompress(&[]), Err(PakError::CorruptBlock(_))));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut block = Compressor::default().compress(&[1, 2, 3, 4]).unwrap();
        block.extend_from_slice(b"GARBAGE!");
        let err = decompress(&block).unwrap_err();
        assert!(matches!(err, PakError::CorruptBlock(_)));
    }

    #[test]
    fn second_member_rejected() {
        let c = Compressor::default();
        let mut block = c.compress(b"first").unwrap();
        block.extend_from_slice(&c.compress(b"second").unwrap());
        assert!(matches!(decompress(&block), Err(PakError::CorruptBlock(_))));
    }

    #[test]
    fn compression_tag_roundtrip() {
        assert_eq!(CompressionKind::Gzip.tag(), 1);
        assert_eq!(CompressionKind::from_tag(1), Some(CompressionKind::Gzip));
        assert!(CompressionKind::from_tag(0).is_none());
        assert!(CompressionKind::from_tag(2).is_none());
    }

    proptest! {
        #[test]
        fn roundtrip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let compressed = Compressor::default().compress(&data).unwrap();
            prop_assert_eq!(decompress(&compressed).unwrap(), data);
        }
    }
}

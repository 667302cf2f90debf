//! The 7-bit encoded package format.
//!
//! Same layout as [`DefaultPak`](crate::DefaultPak), but the entry count,
//! name lengths, and compressed lengths are 7-bit variable-length integers.
//! Smaller headers for typical shader packages; each entry still carries its
//! own framing inline with the payload.

use std::io::Write;

use spak_types::ShaderPak;

use crate::compression::Compressor;
use crate::error::PakResult;
use crate::format::{FormatKind, PakFormat};
use crate::frame::{read_sequential, write_sequential, LengthEncoding, ReadSeek};

/// Sequential format with 7-bit encoded length fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct Alt7BitPak {
    compressor: Compressor,
}

impl Alt7BitPak {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compressor(compressor: Compressor) -> Self {
        Self { compressor }
    }
}

impl PakFormat for Alt7BitPak {
    fn kind(&self) -> FormatKind {
        FormatKind::Alt7Bit
    }

    fn write(&self, out: &mut dyn Write, pak: &ShaderPak) -> PakResult<()> {
        write_sequential(out, pak, &self.compressor, LengthEncoding::VarInt)
    }

    fn read(&self, src: &mut dyn ReadSeek) -> PakResult<ShaderPak> {
        read_sequential(src, LengthEncoding::VarInt)
    }
}

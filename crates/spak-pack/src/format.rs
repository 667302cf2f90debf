use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use spak_types::ShaderPak;

use crate::alt7bit::Alt7BitPak;
use crate::compression::Compressor;
use crate::default_pak::DefaultPak;
use crate::error::PakResult;
use crate::frame::ReadSeek;
use crate::ucsp::UcspPak;

/// A shader package file format.
///
/// Implementations encode a whole [`ShaderPak`] in one call and decode a
/// whole file in one call. The provided `save`/`load` methods hold exactly
/// one buffered file handle for the duration of the call; it is released on
/// every exit path when it drops.
///
/// Decoding never returns a partially populated package: any error aborts
/// the whole load.
pub trait PakFormat {
    /// Which format this is.
    fn kind(&self) -> FormatKind;

    /// Encode `pak` to `out`.
    fn write(&self, out: &mut dyn Write, pak: &ShaderPak) -> PakResult<()>;

    /// Decode a package starting at the current position of `src`.
    fn read(&self, src: &mut dyn ReadSeek) -> PakResult<ShaderPak>;

    /// Write `pak` to a new file at `path`, truncating any existing file.
    ///
    /// A failed save may leave a partial file behind; write to a temporary
    /// path and rename when atomic replacement is needed.
    fn save(&self, path: &Path, pak: &ShaderPak) -> PakResult<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out, pak)?;
        out.flush()?;
        tracing::debug!(
            format = %self.kind(),
            path = %path.display(),
            entries = pak.len(),
            "saved shader package"
        );
        Ok(())
    }

    /// Read the package stored at `path`.
    fn load(&self, path: &Path) -> PakResult<ShaderPak> {
        let mut src = BufReader::new(File::open(path)?);
        let pak = self.read(&mut src)?;
        tracing::debug!(
            format = %self.kind(),
            path = %path.display(),
            entries = pak.len(),
            "loaded shader package"
        );
        Ok(pak)
    }

    /// Encode `pak` in memory.
    fn to_bytes(&self, pak: &ShaderPak) -> PakResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf, pak)?;
        Ok(buf)
    }

    /// Decode a package held in memory.
    fn from_bytes(&self, bytes: &[u8]) -> PakResult<ShaderPak> {
        self.read(&mut Cursor::new(bytes))
    }
}

/// Closed set of supported package formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// Fixed 32-bit length fields, one gzip blob per entry.
    Default,
    /// Same layout as `Default` with 7-bit encoded length fields.
    Alt7Bit,
    /// Magic-tagged package with a lookup table and a single data block.
    Ucsp,
}

impl FormatKind {
    /// All formats, smallest feature set first.
    pub fn all() -> &'static [FormatKind] {
        &[FormatKind::Default, FormatKind::Alt7Bit, FormatKind::Ucsp]
    }

    /// Lowercase identifier used in config files and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            FormatKind::Default => "default",
            FormatKind::Alt7Bit => "alt7bit",
            FormatKind::Ucsp => "ucsp",
        }
    }

    /// Instantiate the codec for this format.
    pub fn codec(&self, compressor: Compressor) -> Box<dyn PakFormat> {
        match self {
            FormatKind::Default => Box::new(DefaultPak::with_compressor(compressor)),
            FormatKind::Alt7Bit => Box::new(Alt7BitPak::with_compressor(compressor)),
            FormatKind::Ucsp => Box::new(UcspPak::with_compressor(compressor)),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, thiserror::Error)]
#[error("unknown package format: {0} (expected one of: default, alt7bit, ucsp)")]
pub struct UnknownFormat(pub String);

impl FromStr for FormatKind {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Save `pak` using format `F` with its default settings.
pub fn save<F: PakFormat + Default>(path: impl AsRef<Path>, pak: &ShaderPak) -> PakResult<()> {
    F::default().save(path.as_ref(), pak)
}

/// Load a package using format `F` with its default settings.
pub fn load<F: PakFormat + Default>(path: impl AsRef<Path>) -> PakResult<ShaderPak> {
    F::default().load(path.as_ref())
}

/// Save `pak` in the format selected by `kind`.
pub fn save_as(kind: FormatKind, path: impl AsRef<Path>, pak: &ShaderPak) -> PakResult<()> {
    kind.codec(Compressor::default()).save(path.as_ref(), pak)
}

/// Load a package in the format selected by `kind`.
pub fn load_as(kind: FormatKind, path: impl AsRef<Path>) -> PakResult<ShaderPak> {
    kind.codec(Compressor::default()).load(path.as_ref())
}

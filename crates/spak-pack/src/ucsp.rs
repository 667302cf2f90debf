//! UCSP indexed package format.
//!
//! ```text
//! magic:            "UCSP" (4 bytes)
//! version:          u8 = 1
//! compression:      u8 = 1 (gzip)
//! entry count:      varint
//! lookup table, per entry:
//!   name length:    varint
//!   name:           UTF-8 bytes
//!   offset:         varint, relative to the start of the data block
//!   length:         varint, compressed size
//! data block:       every compressed payload, concatenated in table order
//! ```
//!
//! The lookup table precedes the data block, so a reader knows where every
//! entry lives before touching any payload and can fetch a single shader
//! without reading the others.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use spak_types::ShaderPak;

use crate::compression::{decompress, CompressionKind, Compressor};
use crate::error::{PakError, PakResult};
use crate::format::{FormatKind, PakFormat};
use crate::frame::{to_u32, FrameReader, ReadSeek};
use crate::varint::write_varint;

/// Magic tag at the start of every UCSP package.
pub const UCSP_MAGIC: &[u8; 4] = b"UCSP";

/// Current format version.
pub const UCSP_VERSION: u8 = 1;

/// Size of the fixed part of the header (magic + version + compression).
pub const UCSP_FIXED_HEADER_SIZE: usize = 6;

/// Location of one entry's compressed payload inside the data block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LutEntry {
    pub name: String,
    /// Byte offset from the start of the data block, not the file.
    pub offset: u32,
    /// Compressed payload size.
    pub length: u32,
}

impl LutEntry {
    /// One past the last byte of this entry within the data block.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }
}

/// Indexed format with a lookup table and a single concatenated data block.
#[derive(Clone, Copy, Debug, Default)]
pub struct UcspPak {
    compressor: Compressor,
}

impl UcspPak {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compressor(compressor: Compressor) -> Self {
        Self { compressor }
    }

    /// Compress every payload and lay out the data block.
    ///
    /// Returns the lookup table and the data block it describes. The whole
    /// block is held in memory because the table is written before it.
    pub fn build(&self, pak: &ShaderPak) -> PakResult<(Vec<LutEntry>, Vec<u8>)> {
        let mut lut = Vec::with_capacity(pak.len());
        let mut data = Vec::new();

        for (name, bytecode) in pak.iter() {
            let compressed = self.compressor.compress(bytecode)?;
            let offset = to_u32(data.len(), "data block offset")?;
            let length = to_u32(compressed.len(), "compressed length")?;
            data.extend_from_slice(&compressed);
            lut.push(LutEntry {
                name: name.to_string(),
                offset,
                length,
            });
        }
        // Offsets of later entries must still fit the varint fields.
        to_u32(data.len(), "data block size")?;

        Ok((lut, data))
    }
}

impl PakFormat for UcspPak {
    fn kind(&self) -> FormatKind {
        FormatKind::Ucsp
    }

    fn write(&self, out: &mut dyn Write, pak: &ShaderPak) -> PakResult<()> {
        let (lut, data) = self.build(pak)?;

        out.write_all(UCSP_MAGIC)?;
        out.write_all(&[UCSP_VERSION, CompressionKind::Gzip.tag()])?;
        write_varint(out, to_u32(lut.len(), "entry count")?)?;

        for entry in &lut {
            write_varint(out, to_u32(entry.name.len(), "name length")?)?;
            out.write_all(entry.name.as_bytes())?;
            write_varint(out, entry.offset)?;
            write_varint(out, entry.length)?;
        }

        out.write_all(&data)?;
        tracing::trace!(entries = lut.len(), data_len = data.len(), "wrote ucsp package");
        Ok(())
    }

    fn read(&self, src: &mut dyn ReadSeek) -> PakResult<ShaderPak> {
        UcspReader::new(src)?.into_pak()
    }
}

/// Random-access reader over a UCSP package.
///
/// Construction validates the header and reads the lookup table; payloads
/// are fetched lazily, one seek and one read per requested entry.
#[derive(Debug)]
pub struct UcspReader<R> {
    src: R,
    entries: Vec<LutEntry>,
    data_base: u64,
    data_len: u64,
}

impl UcspReader<BufReader<File>> {
    /// Open a package file for random access.
    pub fn open(path: impl AsRef<Path>) -> PakResult<Self> {
        Self::new(BufReader::new(File::open(path.as_ref())?))
    }
}

impl<R: Read + Seek> UcspReader<R> {
    /// Parse the header and lookup table from the current position of `src`.
    pub fn new(mut src: R) -> PakResult<Self> {
        let (entries, data_base, data_len) = {
            let mut frame = FrameReader::new(&mut src)?;
            read_header(&mut frame)?;
            let entries = read_lut(&mut frame)?;
            let data_base = frame.position();
            (entries, data_base, frame.len() - data_base)
        };

        if let Some(entry) = entries.iter().find(|e| e.end() > data_len) {
            return Err(out_of_bounds(entry, data_len));
        }

        tracing::trace!(entries = entries.len(), data_base, data_len, "read ucsp lookup table");
        Ok(Self {
            src,
            entries,
            data_base,
            data_len,
        })
    }

    /// Lookup table in file order.
    pub fn entries(&self) -> &[LutEntry] {
        &self.entries
    }

    /// Absolute file position where the data block starts.
    pub fn data_base(&self) -> u64 {
        self.data_base
    }

    /// Size of the data block in bytes.
    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    /// Number of entries in the lookup table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the package has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// Table entry for `name`.
    ///
    /// If a name appears more than once the last occurrence wins, matching
    /// what a full load would keep.
    pub fn entry(&self, name: &str) -> Option<&LutEntry> {
        self.entries.iter().rev().find(|e| e.name == name)
    }

    /// Fetch the compressed payload of `name` without decompressing it.
    pub fn read_raw(&mut self, name: &str) -> PakResult<Option<Vec<u8>>> {
        let Some(entry) = self.entry(name).cloned() else {
            return Ok(None);
        };
        self.fetch(&entry).map(Some)
    }

    /// Fetch and decompress the bytecode of `name`, touching no other entry.
    pub fn read(&mut self, name: &str) -> PakResult<Option<Vec<u8>>> {
        match self.read_raw(name)? {
            Some(raw) => decompress(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// Decode every entry into a package.
    pub fn into_pak(mut self) -> PakResult<ShaderPak> {
        let entries = std::mem::take(&mut self.entries);
        let mut pak = ShaderPak::with_capacity(entries.len());
        for entry in entries {
            let raw = self.fetch(&entry)?;
            pak.add(entry.name, decompress(&raw)?);
        }
        Ok(pak)
    }

    fn fetch(&mut self, entry: &LutEntry) -> PakResult<Vec<u8>> {
        if entry.end() > self.data_len {
            return Err(out_of_bounds(entry, self.data_len));
        }
        self.src
            .seek(SeekFrom::Start(self.data_base + u64::from(entry.offset)))?;
        let mut buf = vec![0u8; entry.length as usize];
        self.src
            .read_exact(&mut buf)
            .map_err(|e| PakError::from_read(e, "data block"))?;
        Ok(buf)
    }
}

fn read_header<R: ReadSeek + ?Sized>(frame: &mut FrameReader<'_, R>) -> PakResult<()> {
    let available = frame.remaining().min(UCSP_FIXED_HEADER_SIZE as u64) as u32;
    let header = frame.read_bytes(available, "header")?;
    let magic = &header[..header.len().min(UCSP_MAGIC.len())];
    if magic != UCSP_MAGIC {
        return Err(PakError::InvalidMagic {
            expected: String::from_utf8_lossy(UCSP_MAGIC).into_owned(),
            actual: String::from_utf8_lossy(magic).into_owned(),
        });
    }
    if header.len() < UCSP_FIXED_HEADER_SIZE {
        return Err(PakError::Truncated { context: "header" });
    }

    let version = header[4];
    if version != UCSP_VERSION {
        return Err(PakError::UnsupportedVersion(version));
    }

    let tag = header[5];
    CompressionKind::from_tag(tag).ok_or(PakError::UnsupportedCompression(tag))?;
    Ok(())
}

fn read_lut<R: ReadSeek + ?Sized>(frame: &mut FrameReader<'_, R>) -> PakResult<Vec<LutEntry>> {
    let count = frame.read_varint()?;
    let mut entries = Vec::with_capacity((count as u64).min(frame.remaining()) as usize);

    for _ in 0..count {
        let name_len = frame.read_varint()?;
        let name = frame.read_name(name_len)?;
        let offset = frame.read_varint()?;
        let length = frame.read_varint()?;
        entries.push(LutEntry {
            name,
            offset,
            length,
        });
    }
    Ok(entries)
}

fn out_of_bounds(entry: &LutEntry, data_len: u64) -> PakError {
    PakError::EntryOutOfBounds {
        name: entry.name.clone(),
        offset: entry.offset,
        length: entry.length,
        data_len,
    }
}

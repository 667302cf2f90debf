use std::io::{Read, Seek, SeekFrom, Write};

use crate::compression::{decompress, Compressor};
use crate::error::{PakError, PakResult};
use crate::varint::{read_varint, write_varint};

/// Anything a package can be decoded from.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Bounds-checked reader over a seekable source.
///
/// Tracks the total stream length so declared lengths are validated against
/// the bytes actually remaining before any allocation happens.
pub(crate) struct FrameReader<'a, R: ReadSeek + ?Sized> {
    inner: &'a mut R,
    pos: u64,
    len: u64,
}

impl<'a, R: ReadSeek + ?Sized> FrameReader<'a, R> {
    /// Wrap `inner`, starting at its current position.
    pub(crate) fn new(inner: &'a mut R) -> PakResult<Self> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, pos, len })
    }

    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.pos)
    }

    pub(crate) fn read_u8(&mut self, context: &'static str) -> PakResult<u8> {
        let mut buf = [0u8; 1];
        self.fill(&mut buf, context)?;
        Ok(buf[0])
    }

    pub(crate) fn read_u32_le(&mut self, context: &'static str) -> PakResult<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf, context)?;
        Ok(u32::from_le_bytes(buf))
    }

    pub(crate) fn read_varint(&mut self) -> PakResult<u32> {
        read_varint(self)
    }

    /// Read `len` bytes after checking they exist.
    pub(crate) fn read_bytes(&mut self, len: u32, field: &'static str) -> PakResult<Vec<u8>> {
        let remaining = self.remaining();
        if u64::from(len) > remaining {
            return Err(PakError::LengthOutOfBounds {
                field,
                declared: u64::from(len),
                remaining,
            });
        }
        let mut buf = vec![0u8; len as usize];
        self.fill(&mut buf, field)?;
        Ok(buf)
    }

    /// Read a length-prefixed name whose length was already decoded.
    pub(crate) fn read_name(&mut self, len: u32) -> PakResult<String> {
        let bytes = self.read_bytes(len, "shader name")?;
        String::from_utf8(bytes).map_err(|e| PakError::InvalidName(e.to_string()))
    }

    /// Fail if anything is left after the last entry.
    pub(crate) fn expect_end(&self) -> PakResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(PakError::TrailingData { remaining }),
        }
    }

    fn fill(&mut self, buf: &mut [u8], context: &'static str) -> PakResult<()> {
        self.inner
            .read_exact(buf)
            .map_err(|e| PakError::from_read(e, context))?;
        self.pos += buf.len() as u64;
        Ok(())
    }
}

impl<R: ReadSeek + ?Sized> Read for FrameReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

/// How a sequential format writes its count and length fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LengthEncoding {
    /// 4-byte little-endian `u32`.
    Fixed32,
    /// 7-bit variable-length integer.
    VarInt,
}

impl LengthEncoding {
    fn write<W: Write + ?Sized>(self, out: &mut W, value: u32) -> PakResult<()> {
        match self {
            Self::Fixed32 => {
                out.write_all(&value.to_le_bytes())?;
                Ok(())
            }
            Self::VarInt => write_varint(out, value),
        }
    }

    fn read<R: ReadSeek + ?Sized>(
        self,
        frame: &mut FrameReader<'_, R>,
        context: &'static str,
    ) -> PakResult<u32> {
        match self {
            Self::Fixed32 => frame.read_u32_le(context),
            Self::VarInt => frame.read_varint(),
        }
    }
}

/// Checked narrowing of a size to the formats' 32-bit fields.
pub(crate) fn to_u32(value: usize, field: &'static str) -> PakResult<u32> {
    u32::try_from(value).map_err(|_| PakError::ValueTooLarge {
        field,
        value: value as u64,
    })
}

/// Write the shared sequential layout: count, then per entry
/// name length + name + compressed length + compressed bytes.
pub(crate) fn write_sequential<W: Write + ?Sized>(
    out: &mut W,
    pak: &spak_types::ShaderPak,
    compressor: &Compressor,
    encoding: LengthEncoding,
) -> PakResult<()> {
    encoding.write(out, to_u32(pak.len(), "entry count")?)?;

    for (name, bytecode) in pak.iter() {
        let compressed = compressor.compress(bytecode)?;

        encoding.write(out, to_u32(name.len(), "name length")?)?;
        out.write_all(name.as_bytes())?;

        encoding.write(out, to_u32(compressed.len(), "compressed length")?)?;
        out.write_all(&compressed)?;

        tracing::trace!(
            name,
            raw = bytecode.len(),
            compressed = compressed.len(),
            "wrote entry"
        );
    }
    Ok(())
}

/// Read the shared sequential layout written by [`write_sequential`].
pub(crate) fn read_sequential<R: ReadSeek + ?Sized>(
    src: &mut R,
    encoding: LengthEncoding,
) -> PakResult<spak_types::ShaderPak> {
    let mut frame = FrameReader::new(src)?;
    let count = encoding.read(&mut frame, "entry count")?;

    // Each entry occupies at least two length fields, so a count larger than
    // the remaining bytes is corrupt and must not drive the allocation.
    let capacity = (count as u64).min(frame.remaining()) as usize;
    let mut pak = spak_types::ShaderPak::with_capacity(capacity);

    for _ in 0..count {
        let name_len = encoding.read(&mut frame, "name length")?;
        let name = frame.read_name(name_len)?;

        let compressed_len = encoding.read(&mut frame, "compressed length")?;
        let compressed = frame.read_bytes(compressed_len, "compressed payload")?;

        let bytecode = decompress(&compressed)?;
        tracing::trace!(name = %name, raw = bytecode.len(), "read entry");
        pak.add(name, bytecode);
    }

    frame.expect_end()?;
    Ok(pak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn frame_tracks_position() {
        let mut cursor = Cursor::new(vec![1u8, 0, 0, 0, 0x80, 0x01, 9]);
        let mut frame = FrameReader::new(&mut cursor).unwrap();
        assert_eq!(frame.len(), 7);
        assert_eq!(frame.read_u32_le("count").unwrap(), 1);
        assert_eq!(frame.read_varint().unwrap(), 128);
        assert_eq!(frame.position(), 6);
        assert_eq!(frame.remaining(), 1);
        assert_eq!(frame.read_u8("tag").unwrap(), 9);
        frame.expect_end().unwrap();
    }

    #[test]
    fn oversized_length_rejected_before_read() {
        let mut cursor = Cursor::new(vec![0u8; 8]);
        let mut frame = FrameReader::new(&mut cursor).unwrap();
        let err = frame.read_bytes(u32::MAX, "compressed payload").unwrap_err();
        assert!(matches!(
            err,
            PakError::LengthOutOfBounds {
                declared: 4_294_967_295,
                remaining: 8,
                ..
            }
        ));
        assert_eq!(frame.position(), 0);
    }

    #[test]
    fn short_fixed_field_is_truncation() {
        let mut cursor = Cursor::new(vec![1u8, 2]);
        let mut frame = FrameReader::new(&mut cursor).unwrap();
        let err = frame.read_u32_le("entry count").unwrap_err();
        assert!(matches!(err, PakError::Truncated { context: "entry count" }));
    }

    #[test]
    fn invalid_utf8_name() {
        let mut cursor = Cursor::new(vec![0xC3, 0x28]);
        let mut frame = FrameReader::new(&mut cursor).unwrap();
        assert!(matches!(frame.read_name(2), Err(PakError::InvalidName(_))));
    }

    #[test]
    fn trailing_data_detected() {
        let mut cursor = Cursor::new(vec![0u8; 3]);
        let frame = FrameReader::new(&mut cursor).unwrap();
        assert!(matches!(
            frame.expect_end(),
            Err(PakError::TrailingData { remaining: 3 })
        ));
    }

    #[test]
    fn starts_at_current_position() {
        let mut cursor = Cursor::new(vec![0xAAu8, 0xBB, 0x05]);
        cursor.set_position(2);
        let mut frame = FrameReader::new(&mut cursor).unwrap();
        assert_eq!(frame.remaining(), 1);
        assert_eq!(frame.read_u8("tag").unwrap(), 5);
    }

    #[test]
    fn to_u32_rejects_overflow() {
        assert_eq!(to_u32(17, "name length").unwrap(), 17);
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            to_u32(u32::MAX as usize + 1, "name length"),
            Err(PakError::ValueTooLarge { .. })
        ));
    }
}

//! 7-bit variable-length encoding of unsigned 32-bit integers.
//!
//! Each byte carries seven bits of the value, least-significant group first.
//! The high bit is set on every byte except the last. A `u32` needs at most
//! five bytes, the fifth holding only the top four bits.

use std::io::{Read, Write};

use crate::error::{PakError, PakResult};

/// Maximum encoded size of a `u32`.
pub const MAX_VARINT_LEN: usize = 5;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7F;

/// Append the encoding of `value` to `buf`.
pub fn encode_varint(buf: &mut Vec<u8>, mut value: u32) {
    while value >= u32::from(CONTINUATION) {
        buf.push((value as u8) | CONTINUATION);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Write the encoding of `value` to `writer`.
pub fn write_varint<W: Write + ?Sized>(writer: &mut W, value: u32) -> PakResult<()> {
    let mut buf = Vec::with_capacity(MAX_VARINT_LEN);
    encode_varint(&mut buf, value);
    writer.write_all(&buf)?;
    Ok(())
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u32) -> usize {
    let bits = (u32::BITS - value.leading_zeros()).max(1) as usize;
    bits.div_ceil(7)
}

/// Decode a value from the front of `data`. Returns (value, bytes_consumed).
pub fn decode_varint(data: &[u8]) -> PakResult<(u32, usize)> {
    let mut acc = Accumulator::default();
    for &byte in data {
        if let Some(value) = acc.push(byte)? {
            return Ok((value, acc.consumed));
        }
    }
    Err(PakError::Truncated {
        context: "encoded integer",
    })
}

/// Read one value from `reader`, consuming exactly its encoded bytes.
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> PakResult<u32> {
    let mut acc = Accumulator::default();
    loop {
        let mut byte = [0u8; 1];
        reader
            .read_exact(&mut byte)
            .map_err(|e| PakError::from_read(e, "encoded integer"))?;
        if let Some(value) = acc.push(byte[0])? {
            return Ok(value);
        }
    }
}

#[derive(Default)]
struct Accumulator {
    value: u32,
    consumed: usize,
}

impl Accumulator {
    /// Feed one byte; yields the value once the terminating byte arrives.
    fn push(&mut self, byte: u8) -> PakResult<Option<u32>> {
        let chunk = u32::from(byte & PAYLOAD);
        let last = byte & CONTINUATION == 0;

        if self.consumed == MAX_VARINT_LEN - 1 {
            if !last {
                return Err(PakError::VarIntTooLong);
            }
            // Only four bits of a u32 remain for the fifth group.
            if chunk > 0x0F {
                return Err(PakError::VarIntOverflow);
            }
        }

        self.value |= chunk << (7 * self.consumed);
        self.consumed += 1;
        Ok(last.then_some(self.value))
    }
}

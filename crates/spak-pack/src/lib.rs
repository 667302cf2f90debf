//! Shader package file formats.
//!
//! Persists a [`ShaderPak`](spak_types::ShaderPak), a named collection of
//! compiled shader blobs, using one of three interchangeable formats. Every
//! payload is compressed as an independent gzip stream.
//!
//! # Formats
//!
//! - [`DefaultPak`]: fixed 32-bit length fields, entries laid out inline.
//!   Simplest to inspect and debug.
//! - [`Alt7BitPak`]: the same layout with 7-bit encoded lengths. Smaller
//!   headers at negligible cost.
//! - [`UcspPak`]: `"UCSP"` magic, version and compression tags, a lookup
//!   table of (name, offset, length), then one concatenated data block.
//!   Smallest output, and [`UcspReader`] can fetch a single entry without
//!   reading the rest.
//!
//! The formats are not interchangeable: loading a file with the wrong codec
//! fails with a format or unsupported-feature error.
//!
//! # Architecture
//!
//! - [`varint`]: 7-bit variable-length `u32` encoding
//! - [`compression`]: gzip compressor and decompressor
//! - [`PakFormat`]: the save/load capability every codec implements
//! - [`FormatKind`]: closed enumeration used to pick a codec by value
//!
//! All operations are synchronous, whole-file, and hold one file handle for
//! the duration of the call.

pub mod alt7bit;
pub mod compression;
pub mod default_pak;
pub mod error;
pub mod format;
mod frame;
pub mod ucsp;
pub mod varint;

pub use alt7bit::Alt7BitPak;
pub use compression::{decompress, CompressionKind, Compressor, DEFAULT_LEVEL};
pub use default_pak::DefaultPak;
pub use error::{ErrorCategory, PakError, PakResult};
pub use format::{load, load_as, save, save_as, FormatKind, PakFormat, UnknownFormat};
pub use frame::ReadSeek;
pub use ucsp::{LutEntry, UcspPak, UcspReader, UCSP_MAGIC, UCSP_VERSION};

use thiserror::Error;

/// Broad error classes callers can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Underlying file read/write/seek failure.
    Io,
    /// The bytes on disk are not a well-formed package.
    Format,
    /// Well-formed, but uses something this build cannot handle.
    Unsupported,
}

#[derive(Debug, Error)]
pub enum PakError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid indexed package: expected magic {expected:?}, got {actual:?}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unexpected end of file while reading {context}")]
    Truncated { context: &'static str },

    #[error("{field} of {declared} bytes exceeds the {remaining} bytes remaining")]
    LengthOutOfBounds {
        field: &'static str,
        declared: u64,
        remaining: u64,
    },

    #[error("encoded integer too long")]
    VarIntTooLong,

    #[error("encoded integer overflows 32 bits")]
    VarIntOverflow,

    #[error("corrupt compressed block: {0}")]
    CorruptBlock(String),

    #[error("shader name is not valid UTF-8: {0}")]
    InvalidName(String),

    #[error("{remaining} unexpected bytes after the last entry")]
    TrailingData { remaining: u64 },

    #[error("entry {name:?} ({offset}+{length}) exceeds {data_len}-byte data block")]
    EntryOutOfBounds {
        name: String,
        offset: u32,
        length: u32,
        data_len: u64,
    },

    #[error("unsupported package version: {0}")]
    UnsupportedVersion(u8),

    #[error("unsupported compression type: {0}")]
    UnsupportedCompression(u8),

    #[error("{field} of {value} does not fit in a 32-bit field")]
    ValueTooLarge { field: &'static str, value: u64 },
}

impl PakError {
    /// Which class of failure this is.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io(_) => ErrorCategory::Io,
            Self::UnsupportedVersion(_)
            | Self::UnsupportedCompression(_)
            | Self::ValueTooLarge { .. } => ErrorCategory::Unsupported,
            _ => ErrorCategory::Format,
        }
    }

    /// Returns `true` for structural corruption.
    pub fn is_format_error(&self) -> bool {
        self.category() == ErrorCategory::Format
    }

    /// Returns `true` for recognized-but-unsupported features.
    pub fn is_unsupported(&self) -> bool {
        self.category() == ErrorCategory::Unsupported
    }

    /// Map an I/O failure during structured reads, treating EOF as truncation.
    pub(crate) fn from_read(err: std::io::Error, context: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated { context }
        } else {
            Self::Io(err)
        }
    }
}

pub type PakResult<T> = Result<T, PakError>;

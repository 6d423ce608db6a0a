use thiserror::Error;

pub type Result<T, E = FormatError> = std::result::Result<T, E>;

/// Structural problems found while interpreting bytes as a trigger activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("buffer too short: {len} < {min}")]
    TooShort { len: usize, min: usize },

    #[error("record truncated: buffer holds {len} bytes, header declares {expected}")]
    Truncated { len: usize, expected: usize },

    #[error("trailing bytes after record: buffer holds {len} bytes, record is {expected}")]
    TrailingBytes { len: usize, expected: usize },

    #[error("primitive count {count} overflows the addressable record size")]
    CountOverflow { count: u64 },

    #[error("primitive count {count} exceeds limit {max}")]
    TooManyPrimitives { count: usize, max: usize },

    #[error("unsupported trigger activity version {0}")]
    UnsupportedVersion(u16),

    #[error("unknown trigger activity type {0}")]
    UnknownActivityType(u32),

    #[error("unknown trigger activity algorithm {0}")]
    UnknownAlgorithm(u32),

    #[error("primitive array is not {align}-byte aligned")]
    Misaligned { align: usize },
}

/// Indexed primitive access past the end of the trailing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("primitive index {index} out of range for record with {len} primitives")]
pub struct IndexError {
    pub index: usize,
    pub len: usize,
}

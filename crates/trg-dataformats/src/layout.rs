//! Byte layout of a complete trigger activity record.
//!
//! ```text
//! offset 0    HeaderRecord            (HeaderRecord::SIZE_BYTES)
//! offset 72   count: u64              (COUNT_SIZE_BYTES)
//! offset 80   P[count]                (count * size_of::<P>())
//! ```
//!
//! The count field is the only length information a record carries.

use core::marker::PhantomData;
use core::mem::{align_of, size_of};

use bytemuck::Pod;

use crate::error::{FormatError, Result};
use crate::header::HeaderRecord;

pub const COUNT_OFFSET: usize = HeaderRecord::SIZE_BYTES;
pub const COUNT_SIZE_BYTES: usize = size_of::<u64>();

/// Size of the fixed portion (header + count); also the offset of the first primitive.
pub const FIXED_SIZE_BYTES: usize = COUNT_OFFSET + COUNT_SIZE_BYTES;

/// Largest primitive alignment an owned record can store. Owned storage is a `u64` arena.
pub const MAX_PRIMITIVE_ALIGN: usize = align_of::<u64>();

/// Caps applied while interpreting foreign bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_primitives: usize,
}

impl Limits {
    pub const fn new(max_primitives: usize) -> Self {
        Self { max_primitives }
    }
}

impl Default for Limits {
    /// No cap beyond what the supplied buffer can hold.
    fn default() -> Self {
        Self {
            max_primitives: usize::MAX,
        }
    }
}

pub(crate) struct PrimitiveLayout<P>(PhantomData<P>);

impl<P: Pod> PrimitiveLayout<P> {
    /// Evaluated per instantiation; referencing it rejects zero-sized and over-aligned
    /// primitive types at compile time.
    pub(crate) const ASSERT_ALIGN: () = assert!(
        size_of::<P>() > 0 && align_of::<P>() <= MAX_PRIMITIVE_ALIGN,
        "trigger primitives must be non-empty and at most 8-byte aligned"
    );

    pub(crate) const SIZE: usize = size_of::<P>();
}

/// Total record size for `count` primitives of type `P`.
pub fn record_size<P: Pod>(count: u64) -> Result<usize> {
    usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(PrimitiveLayout::<P>::SIZE))
        .and_then(|n| n.checked_add(FIXED_SIZE_BYTES))
        .ok_or(FormatError::CountOverflow { count })
}

/// Structural validation of the record at the front of `buf`: fixed portion present, header
/// recognised, declared count within `limits` and within the buffer. Returns the record size.
///
/// Alignment is not checked here; only typed overlays need it.
pub fn validate_record<P: Pod>(buf: &[u8], limits: &Limits) -> Result<usize> {
    #[allow(clippy::let_unit_value)]
    let () = PrimitiveLayout::<P>::ASSERT_ALIGN;

    if buf.len() < FIXED_SIZE_BYTES {
        return Err(FormatError::TooShort {
            len: buf.len(),
            min: FIXED_SIZE_BYTES,
        });
    }

    HeaderRecord::overlay(buf)?;
    let count = read_count(buf)?;
    let size = record_size::<P>(count)?;
    // `record_size` already proved the count fits in usize.
    let len = count as usize;
    if len > limits.max_primitives {
        return Err(FormatError::TooManyPrimitives {
            count: len,
            max: limits.max_primitives,
        });
    }
    if size > buf.len() {
        return Err(FormatError::Truncated {
            len: buf.len(),
            expected: size,
        });
    }
    Ok(size)
}

/// Read the count field of the record at the front of `buf`.
pub(crate) fn read_count(buf: &[u8]) -> Result<u64> {
    let bytes = buf
        .get(COUNT_OFFSET..FIXED_SIZE_BYTES)
        .ok_or(FormatError::TooShort {
            len: buf.len(),
            min: FIXED_SIZE_BYTES,
        })?;
    let mut raw = [0u8; COUNT_SIZE_BYTES];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_portion_is_header_plus_count() {
        assert_eq!(COUNT_OFFSET, 72);
        assert_eq!(FIXED_SIZE_BYTES, 80);
    }

    #[test]
    fn record_size_follows_size_law() {
        assert_eq!(record_size::<[u8; 16]>(0), Ok(80));
        assert_eq!(record_size::<[u8; 16]>(2), Ok(112));
        assert_eq!(record_size::<u64>(10), Ok(160));
    }

    #[test]
    fn record_size_reports_overflow() {
        assert_eq!(
            record_size::<[u8; 16]>(u64::MAX),
            Err(FormatError::CountOverflow { count: u64::MAX })
        );
        let near = (usize::MAX / 16) as u64;
        assert_eq!(
            record_size::<[u8; 16]>(near),
            Err(FormatError::CountOverflow { count: near })
        );
    }

    #[test]
    fn read_count_needs_the_fixed_portion() {
        let mut buf = vec![0u8; FIXED_SIZE_BYTES];
        buf[COUNT_OFFSET..].copy_from_slice(&7u64.to_le_bytes());
        assert_eq!(read_count(&buf), Ok(7));
        assert_eq!(
            read_count(&buf[..FIXED_SIZE_BYTES - 1]),
            Err(FormatError::TooShort {
                len: FIXED_SIZE_BYTES - 1,
                min: FIXED_SIZE_BYTES,
            })
        );
    }
}

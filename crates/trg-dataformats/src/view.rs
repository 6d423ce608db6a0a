use core::fmt;
use core::mem::align_of;

use bytemuck::Pod;

use crate::error::{FormatError, IndexError, Result};
use crate::header::HeaderRecord;
use crate::layout::{validate_record, Limits, FIXED_SIZE_BYTES};
use crate::record::ActivityRecord;

/// Borrowed, zero-copy view of a trigger activity record inside a caller-owned buffer.
///
/// Construction validates the fixed portion, the header and that the declared primitive count
/// fits inside the buffer. After that every accessor is O(1) and hands out references into the
/// original bytes; the buffer is never written.
pub struct RecordView<'a, P> {
    bytes: &'a [u8],
    header: &'a HeaderRecord,
    primitives: &'a [P],
}

impl<'a, P: Pod> RecordView<'a, P> {
    /// Overlay the record at the front of `buf`. Bytes past the end of the record are ignored.
    pub fn new(buf: &'a [u8]) -> Result<Self> {
        Self::with_limits(buf, &Limits::default())
    }

    pub fn with_limits(buf: &'a [u8], limits: &Limits) -> Result<Self> {
        let size = validate_record::<P>(buf, limits)?;
        let bytes = &buf[..size];
        let primitives = bytemuck::try_cast_slice(&bytes[FIXED_SIZE_BYTES..]).map_err(|_| {
            FormatError::Misaligned {
                align: align_of::<P>(),
            }
        })?;

        Ok(Self {
            bytes,
            header: bytemuck::from_bytes(&bytes[..HeaderRecord::SIZE_BYTES]),
            primitives,
        })
    }

    /// Build a view over bytes already known to hold a valid record.
    ///
    /// Only used for storage this crate laid out itself (aligned arena, exact size).
    pub(crate) fn from_trusted(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            header: bytemuck::from_bytes(&bytes[..HeaderRecord::SIZE_BYTES]),
            primitives: bytemuck::cast_slice(&bytes[FIXED_SIZE_BYTES..]),
        }
    }

    pub fn header(&self) -> &'a HeaderRecord {
        self.header
    }

    /// Number of trailing primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Alias of [`RecordView::len`].
    pub fn length(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Exact size of the record in bytes (header, count field and primitives).
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn get(&self, index: usize) -> Result<&'a P, IndexError> {
        self.primitives.get(index).ok_or(IndexError {
            index,
            len: self.primitives.len(),
        })
    }

    pub fn primitives(&self) -> &'a [P] {
        self.primitives
    }

    pub fn iter(&self) -> core::slice::Iter<'a, P> {
        self.primitives.iter()
    }

    /// The record's bytes inside the original buffer.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Owned snapshot of the record bytes, for when the backing buffer will not outlive the
    /// consumer.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub fn to_record(&self) -> ActivityRecord<P> {
        ActivityRecord::from(*self)
    }
}

impl<P> Clone for RecordView<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for RecordView<'_, P> {}

impl<P> PartialEq for RecordView<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<P> Eq for RecordView<'_, P> {}

impl<P> fmt::Debug for RecordView<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordView")
            .field("header", self.header)
            .field("len", &self.primitives.len())
            .field("byte_size", &self.bytes.len())
            .finish()
    }
}

impl<'a, P: Pod> IntoIterator for RecordView<'a, P> {
    type Item = &'a P;
    type IntoIter = core::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.primitives.iter()
    }
}

impl<'a, P: Pod> From<&'a ActivityRecord<P>> for RecordView<'a, P> {
    fn from(record: &'a ActivityRecord<P>) -> Self {
        record.as_view()
    }
}

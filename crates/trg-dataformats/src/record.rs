use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;

use bytemuck::Pod;

use crate::error::{IndexError, Result};
use crate::header::HeaderRecord;
use crate::layout::{validate_record, Limits, PrimitiveLayout, COUNT_OFFSET, FIXED_SIZE_BYTES};
use crate::view::RecordView;

const WORD: usize = size_of::<u64>();

/// Owned trigger activity: header, count and primitives in one contiguous allocation.
///
/// The bytes are kept in a `u64` arena so the primitive array is always aligned for `P`, and
/// `as_bytes()` is exactly the wire representation.
#[derive(Clone)]
pub struct ActivityRecord<P> {
    words: Vec<u64>,
    byte_len: usize,
    _primitive: PhantomData<P>,
}

impl<P: Pod> ActivityRecord<P> {
    /// Empty record with a default header.
    pub fn new() -> Self {
        Self::empty(&HeaderRecord::new())
    }

    /// Empty record carrying `header`. Headers the decoder would reject (unknown version, type or
    /// algorithm) are refused here so every owned record encodes to decodable bytes.
    pub fn with_header(header: HeaderRecord) -> Result<Self> {
        header.validate()?;
        Ok(Self::empty(&header))
    }

    pub fn from_parts(header: HeaderRecord, primitives: &[P]) -> Result<Self> {
        let mut record = Self::with_header(header)?;
        record.extend_from_slice(primitives);
        Ok(record)
    }

    fn empty(header: &HeaderRecord) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = PrimitiveLayout::<P>::ASSERT_ALIGN;

        let mut record = Self {
            words: vec![0; FIXED_SIZE_BYTES / WORD],
            byte_len: FIXED_SIZE_BYTES,
            _primitive: PhantomData,
        };
        record.write_header(header);
        record
    }

    /// Copy the record at the front of `buf` into owned storage.
    ///
    /// `buf` may extend past the record; exactly `byte_size()` bytes are copied. The same
    /// validation as [`RecordView::new`] applies, except that `buf` needs no particular
    /// alignment.
    pub fn copy_from_bytes(buf: &[u8]) -> Result<Self> {
        Self::copy_from_bytes_with_limits(buf, &Limits::default())
    }

    pub fn copy_from_bytes_with_limits(buf: &[u8], limits: &Limits) -> Result<Self> {
        let size = validate_record::<P>(buf, limits)?;
        Ok(Self::from_validated_bytes(&buf[..size]))
    }

    /// Copy bytes already validated as a complete record. The source alignment is irrelevant.
    pub(crate) fn from_validated_bytes(bytes: &[u8]) -> Self {
        let mut words = vec![0u64; bytes.len().div_ceil(WORD)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
        Self {
            words,
            byte_len: bytes.len(),
            _primitive: PhantomData,
        }
    }

    pub fn header(&self) -> &HeaderRecord {
        bytemuck::from_bytes(&self.as_bytes()[..HeaderRecord::SIZE_BYTES])
    }

    /// Replace the header. On error the record is left unchanged.
    pub fn set_header(&mut self, header: HeaderRecord) -> Result<()> {
        header.validate()?;
        self.write_header(&header);
        Ok(())
    }

    fn write_header(&mut self, header: &HeaderRecord) {
        self.bytes_mut()[..HeaderRecord::SIZE_BYTES].copy_from_slice(header.as_bytes());
    }

    /// Append one primitive and bump the embedded count.
    pub fn push(&mut self, primitive: P) {
        self.extend_from_slice(core::slice::from_ref(&primitive));
    }

    pub fn extend_from_slice(&mut self, primitives: &[P]) {
        if primitives.is_empty() {
            return;
        }
        let added: &[u8] = bytemuck::cast_slice(primitives);
        let start = self.byte_len;
        let end = start + added.len();
        self.words.resize(end.div_ceil(WORD), 0);
        self.byte_len = end;
        self.bytes_mut()[start..end].copy_from_slice(added);

        let count = self.len() as u64;
        self.bytes_mut()[COUNT_OFFSET..FIXED_SIZE_BYTES].copy_from_slice(&count.to_le_bytes());
    }

    /// Number of trailing primitives.
    pub fn len(&self) -> usize {
        (self.byte_len - FIXED_SIZE_BYTES) / PrimitiveLayout::<P>::SIZE
    }

    /// Alias of [`ActivityRecord::len`].
    pub fn length(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.byte_len == FIXED_SIZE_BYTES
    }

    /// `HeaderRecord::SIZE_BYTES + COUNT_SIZE_BYTES + len() * size_of::<P>()`.
    pub fn byte_size(&self) -> usize {
        self.byte_len
    }

    pub fn get(&self, index: usize) -> Result<&P, IndexError> {
        self.as_view().get(index)
    }

    pub fn primitives(&self) -> &[P] {
        self.as_view().primitives()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, P> {
        self.primitives().iter()
    }

    /// The exact wire representation.
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.byte_len]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    pub fn as_view(&self) -> RecordView<'_, P> {
        RecordView::from_trusted(self.as_bytes())
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..self.byte_len]
    }
}

impl<P: Pod> Default for ActivityRecord<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pod> From<RecordView<'_, P>> for ActivityRecord<P> {
    fn from(view: RecordView<'_, P>) -> Self {
        Self::from_validated_bytes(view.as_bytes())
    }
}

impl<P: Pod> Extend<P> for ActivityRecord<P> {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for primitive in iter {
            self.push(primitive);
        }
    }
}

impl<'a, P: Pod> IntoIterator for &'a ActivityRecord<P> {
    type Item = &'a P;
    type IntoIter = core::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<P: Pod> PartialEq for ActivityRecord<P> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<P: Pod> Eq for ActivityRecord<P> {}

impl<P: Pod> fmt::Debug for ActivityRecord<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityRecord")
            .field("header", self.header())
            .field("len", &self.len())
            .field("byte_size", &self.byte_size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;
    use crate::header::{ActivityAlgorithm, ActivityType};
    use bytemuck::Zeroable;

    #[repr(C)]
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
    struct Tp {
        time: u64,
        channel: u32,
        adc: u32,
    }

    fn tp(n: u32) -> Tp {
        Tp {
            time: u64::from(n) * 10,
            channel: n,
            adc: n * 100,
        }
    }

    #[test]
    fn empty_record_is_just_the_fixed_portion() {
        let record = ActivityRecord::<Tp>::new();
        assert!(record.is_empty());
        assert_eq!(record.len(), 0);
        assert_eq!(record.byte_size(), FIXED_SIZE_BYTES);
        assert_eq!(record.header(), &HeaderRecord::new());
        assert_eq!(record.get(0), Err(IndexError { index: 0, len: 0 }));
    }

    #[test]
    fn push_keeps_bytes_contiguous_and_count_in_sync() {
        let header = HeaderRecord::new().with_activity_type(ActivityType::Tpc);
        let mut record = ActivityRecord::with_header(header).unwrap();
        record.push(tp(1));
        record.push(tp(2));
        record.extend([tp(3)]);

        assert_eq!(record.len(), 3);
        assert_eq!(record.byte_size(), FIXED_SIZE_BYTES + 3 * 16);

        let bytes = record.as_bytes();
        assert_eq!(&bytes[..HeaderRecord::SIZE_BYTES], header.as_bytes());
        assert_eq!(&bytes[COUNT_OFFSET..FIXED_SIZE_BYTES], &3u64.to_le_bytes());
        assert_eq!(
            &bytes[FIXED_SIZE_BYTES..],
            bytemuck::cast_slice::<Tp, u8>(&[tp(1), tp(2), tp(3)])
        );
        assert_eq!(record.get(2), Ok(&tp(3)));
        assert_eq!(record.get(3), Err(IndexError { index: 3, len: 3 }));
    }

    #[test]
    fn odd_sized_primitives_round_the_arena_but_not_the_record() {
        let mut record = ActivityRecord::<[u8; 3]>::new();
        record.push([1, 2, 3]);
        assert_eq!(record.byte_size(), FIXED_SIZE_BYTES + 3);
        assert_eq!(record.as_bytes().len(), FIXED_SIZE_BYTES + 3);
        record.push([4, 5, 6]);
        assert_eq!(record.primitives(), &[[1u8, 2, 3], [4, 5, 6]]);
    }

    #[test]
    fn set_header_rewrites_only_the_header() {
        let mut record = ActivityRecord::from_parts(HeaderRecord::new(), &[tp(7)]).unwrap();
        let header = HeaderRecord::new()
            .with_algorithm(ActivityAlgorithm::MichelElectron)
            .with_detid(3);
        record.set_header(header).unwrap();
        assert_eq!(record.header().algorithm(), ActivityAlgorithm::MichelElectron);
        assert_eq!(record.header().detid(), 3);
        assert_eq!(record.primitives(), &[tp(7)]);
    }

    #[test]
    fn copy_from_bytes_takes_exactly_one_record() {
        let original = ActivityRecord::from_parts(HeaderRecord::new(), &[tp(1), tp(2)]).unwrap();
        let mut buf = original.as_bytes().to_vec();
        buf.extend_from_slice(&[0xAA; 5]);

        let copy = ActivityRecord::<Tp>::copy_from_bytes(&buf).unwrap();
        assert_eq!(copy, original);
        assert_eq!(copy.byte_size(), original.byte_size());
    }

    #[test]
    fn copy_from_bytes_rejects_regions_below_the_fixed_portion() {
        let buf = [0u8; FIXED_SIZE_BYTES - 1];
        assert_eq!(
            ActivityRecord::<Tp>::copy_from_bytes(&buf),
            Err(FormatError::TooShort {
                len: FIXED_SIZE_BYTES - 1,
                min: FIXED_SIZE_BYTES,
            })
        );
    }

    #[test]
    fn zeroed_header_is_refused_by_every_producer_path() {
        assert_eq!(
            ActivityRecord::<Tp>::from_parts(HeaderRecord::zeroed(), &[tp(1)]),
            Err(FormatError::UnsupportedVersion(0))
        );
        assert_eq!(
            ActivityRecord::<Tp>::with_header(HeaderRecord::zeroed()),
            Err(FormatError::UnsupportedVersion(0))
        );

        let mut record = ActivityRecord::from_parts(HeaderRecord::new(), &[tp(1)]).unwrap();
        let before = record.clone();
        assert_eq!(
            record.set_header(HeaderRecord::zeroed()),
            Err(FormatError::UnsupportedVersion(0))
        );
        assert_eq!(record, before);
    }

    #[test]
    fn foreign_header_with_unknown_type_is_refused() {
        let mut raw = HeaderRecord::new().as_bytes().to_vec();
        raw[64..68].copy_from_slice(&9u32.to_le_bytes());
        let header: HeaderRecord = bytemuck::pod_read_unaligned(&raw);
        assert_eq!(header.activity_type_raw(), 9);

        assert_eq!(
            ActivityRecord::<Tp>::from_parts(header, &[tp(2)]),
            Err(FormatError::UnknownActivityType(9))
        );
    }

    #[test]
    fn view_of_owned_record_borrows_its_storage() {
        let record = ActivityRecord::from_parts(HeaderRecord::new(), &[tp(4)]).unwrap();
        let view = record.as_view();
        assert_eq!(view.as_bytes().as_ptr(), record.as_bytes().as_ptr());
        assert!(core::ptr::eq(view.get(0).unwrap(), record.get(0).unwrap()));
        assert_eq!(view.to_record(), record);
    }
}

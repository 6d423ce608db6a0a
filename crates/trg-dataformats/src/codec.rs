//! Conversion between records and contiguous byte sequences.
//!
//! The encoding is the in-memory layout itself (see [`crate::layout`]); there is no framing
//! beyond the embedded count. Decoding is strict: the byte sequence must be exactly one record.

use bytemuck::Pod;

use crate::error::{FormatError, Result};
use crate::header::HeaderRecord;
use crate::layout::{validate_record, Limits};
use crate::record::ActivityRecord;
use crate::view::RecordView;

/// Encode one record. Accepts `&ActivityRecord<P>` or a `RecordView<P>`.
pub fn encode<'a, P: Pod>(record: impl Into<RecordView<'a, P>>) -> Vec<u8> {
    record.into().to_bytes()
}

/// Append the encoding of `record` to `out`.
pub fn encode_into<'a, P: Pod>(record: impl Into<RecordView<'a, P>>, out: &mut Vec<u8>) {
    out.extend_from_slice(record.into().as_bytes());
}

/// Encode a header and primitives without building an owned record first. The header must pass
/// [`HeaderRecord::validate`], the same check the decoder applies.
pub fn encode_parts<P: Pod>(header: &HeaderRecord, primitives: &[P]) -> Result<Vec<u8>> {
    header.validate()?;
    let body: &[u8] = bytemuck::cast_slice(primitives);
    let count = primitives.len() as u64;
    let mut out = Vec::with_capacity(
        HeaderRecord::SIZE_BYTES
            .saturating_add(core::mem::size_of::<u64>())
            .saturating_add(body.len()),
    );
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(body);
    Ok(out)
}

/// Decode exactly one record from `bytes` into owned storage.
pub fn decode<P: Pod>(bytes: &[u8]) -> Result<ActivityRecord<P>> {
    decode_with_limits(bytes, &Limits::default())
}

pub fn decode_with_limits<P: Pod>(bytes: &[u8], limits: &Limits) -> Result<ActivityRecord<P>> {
    let size = validate_record::<P>(bytes, limits)?;
    if size != bytes.len() {
        return Err(FormatError::TrailingBytes {
            len: bytes.len(),
            expected: size,
        });
    }
    Ok(ActivityRecord::from_validated_bytes(bytes))
}

/// Concatenate several records into one buffer.
pub fn encode_stream<'a, P, I>(records: I) -> Vec<u8>
where
    P: Pod + 'a,
    I: IntoIterator,
    I::Item: Into<RecordView<'a, P>>,
{
    let mut out = Vec::new();
    for record in records {
        encode_into(record, &mut out);
    }
    out
}

/// Decode every record of a back-to-back buffer into owned copies. Fails on the first malformed
/// record. Unlike [`crate::ActivityStream`] the input needs no particular alignment.
pub fn decode_stream<P: Pod>(bytes: &[u8]) -> Result<Vec<ActivityRecord<P>>> {
    decode_stream_with_limits(bytes, &Limits::default())
}

pub fn decode_stream_with_limits<P: Pod>(
    bytes: &[u8],
    limits: &Limits,
) -> Result<Vec<ActivityRecord<P>>> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        let size = validate_record::<P>(rest, limits)?;
        records.push(ActivityRecord::from_validated_bytes(&rest[..size]));
        offset += size;
    }
    Ok(records)
}

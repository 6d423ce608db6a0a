//! Trigger activity record format.
//!
//! A trigger activity is a fixed 72-byte [`HeaderRecord`], a `u64` primitive count and `count`
//! fixed-size trigger primitives, laid out contiguously. Producers build an owned
//! [`ActivityRecord`]; consumers overlay received bytes with a zero-copy [`RecordView`] or take
//! an owned copy through [`codec::decode`]. The primitive type is opaque here: any
//! `bytemuck::Pod` type with alignment of at most 8 bytes.
//!
//! All foreign input is validated before it is interpreted (length, version, declared count
//! against the buffer size) and every indexed access is bounds-checked.

#[cfg(target_endian = "big")]
compile_error!(
    "the trigger activity wire format is little-endian; big-endian targets are not supported"
);

pub mod codec;
mod error;
pub mod header;
pub mod layout;
mod record;
mod stream;
mod view;

pub use error::{FormatError, IndexError, Result};
pub use header::{
    ActivityAlgorithm, ActivityType, HeaderRecord, SUPPORTED_VERSIONS, TRIGGER_ACTIVITY_VERSION,
};
pub use layout::{Limits, COUNT_SIZE_BYTES, FIXED_SIZE_BYTES};
pub use record::ActivityRecord;
pub use stream::ActivityStream;
pub use view::RecordView;

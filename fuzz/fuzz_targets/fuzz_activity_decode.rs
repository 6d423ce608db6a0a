#![no_main]

use libfuzzer_sys::fuzz_target;
use trg_dataformats::codec::{decode, decode_stream_with_limits, encode};
use trg_dataformats::{ActivityRecord, ActivityStream, Limits, RecordView};

// Narrow primitives keep the view path alignment-free; the u64 case exercises `Misaligned`.
type Narrow = [u8; 12];

fuzz_target!(|data: &[u8]| {
    let limits = Limits::new(1 << 16);

    if let Ok(view) = RecordView::<Narrow>::with_limits(data, &limits) {
        assert!(view.byte_size() <= data.len());
        assert_eq!(view.as_bytes(), &data[..view.byte_size()]);
        let _ = view.get(view.len());
        let copy = view.to_record();
        assert_eq!(copy.as_bytes(), view.as_bytes());
    }

    let _ = RecordView::<u64>::with_limits(data, &limits);

    if let Ok(record) = decode::<Narrow>(data) {
        assert_eq!(encode(&record), data);
    }

    if let Ok(record) = ActivityRecord::<Narrow>::copy_from_bytes_with_limits(data, &limits) {
        assert_eq!(record.as_bytes(), &data[..record.byte_size()]);
    }

    let mut walked = 0usize;
    for item in ActivityStream::<[u8; 8]>::with_limits(data, &limits) {
        match item {
            Ok(view) => walked += view.byte_size(),
            Err(_) => break,
        }
    }
    assert!(walked <= data.len());

    let _ = decode_stream_with_limits::<[u8; 8]>(data, &limits);
});

#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use trg_dataformats::codec::{decode, encode};
use trg_dataformats::{ActivityAlgorithm, ActivityRecord, ActivityType, HeaderRecord};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let header = HeaderRecord::new()
        .with_time_start(u.arbitrary().unwrap_or(0))
        .with_time_end(u.arbitrary().unwrap_or(0))
        .with_channel_start(u.arbitrary().unwrap_or(0))
        .with_channel_end(u.arbitrary().unwrap_or(0))
        .with_adc_peak(u.arbitrary().unwrap_or(0))
        .with_detid(u.arbitrary().unwrap_or(0))
        .with_activity_type(
            ActivityType::from_u32(u.int_in_range(0..=2).unwrap_or(0)).unwrap_or_default(),
        )
        .with_algorithm(
            ActivityAlgorithm::from_u32(u.int_in_range(0..=6).unwrap_or(0)).unwrap_or_default(),
        );

    let mut record =
        ActivityRecord::<[u8; 24]>::with_header(header).expect("builders only set known values");
    let count: u8 = u.arbitrary().unwrap_or(0);
    for _ in 0..count {
        let Ok(prim) = u.arbitrary::<[u8; 24]>() else {
            break;
        };
        record.push(prim);
    }

    let bytes = encode(&record);
    assert_eq!(bytes.len(), record.byte_size());
    let decoded = decode::<[u8; 24]>(&bytes).expect("encoded record must decode");
    assert_eq!(decoded, record);
    assert!(decoded.get(record.len()).is_err());
});

use proptest::prelude::*;
use trg_dataformats::codec::{decode, decode_stream, encode, encode_parts, encode_stream};
use trg_dataformats::{
    ActivityAlgorithm, ActivityRecord, ActivityStream, ActivityType, FormatError, HeaderRecord,
    IndexError, Limits, RecordView, FIXED_SIZE_BYTES,
};

type Prim = [u8; 8];

fn activity_type() -> impl Strategy<Value = ActivityType> {
    prop_oneof![
        Just(ActivityType::Unknown),
        Just(ActivityType::Tpc),
        Just(ActivityType::Pds),
    ]
}

fn algorithm() -> impl Strategy<Value = ActivityAlgorithm> {
    (0u32..=6).prop_map(|v| ActivityAlgorithm::from_u32(v).unwrap_or_default())
}

fn header() -> impl Strategy<Value = HeaderRecord> {
    (
        any::<[u64; 4]>(),
        any::<[i32; 3]>(),
        any::<(u32, u32, u16)>(),
        activity_type(),
        algorithm(),
    )
        .prop_map(|(t, c, (integral, peak, detid), kind, alg)| {
            HeaderRecord::new()
                .with_time_start(t[0])
                .with_time_end(t[1])
                .with_time_peak(t[2])
                .with_time_activity(t[3])
                .with_channel_start(c[0])
                .with_channel_end(c[1])
                .with_channel_peak(c[2])
                .with_adc_integral(integral)
                .with_adc_peak(peak)
                .with_detid(detid)
                .with_activity_type(kind)
                .with_algorithm(alg)
        })
}

fn record() -> impl Strategy<Value = ActivityRecord<Prim>> {
    (header(), proptest::collection::vec(any::<Prim>(), 0..64))
        .prop_map(|(h, prims)| ActivityRecord::from_parts(h, &prims).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        rng_algorithm: proptest::test_runner::RngAlgorithm::ChaCha,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0x7A_C7_1F),
        .. ProptestConfig::default()
    })]

    #[test]
    fn decode_inverts_encode(record in record()) {
        let bytes = encode(&record);
        prop_assert_eq!(bytes.len(), FIXED_SIZE_BYTES + record.len() * 8);
        prop_assert_eq!(&bytes, &encode_parts(record.header(), record.primitives()).unwrap());
        prop_assert_eq!(&bytes, &encode(&record));

        let decoded = decode::<Prim>(&bytes).unwrap();
        prop_assert_eq!(decoded.header(), record.header());
        prop_assert_eq!(decoded.primitives(), record.primitives());
    }

    #[test]
    fn indexed_access_is_bounds_checked(record in record(), index in 0usize..128) {
        let view = record.as_view();
        match view.get(index) {
            Ok(p) => {
                prop_assert!(index < record.len());
                prop_assert_eq!(p, &record.primitives()[index]);
            }
            Err(err) => {
                prop_assert!(index >= record.len());
                prop_assert_eq!(err, IndexError { index, len: record.len() });
            }
        }
    }

    #[test]
    fn any_truncation_is_rejected(record in record(), cut in 1usize..=64) {
        let bytes = encode(&record);
        let len = bytes.len().saturating_sub(cut);
        let err = ActivityRecord::<Prim>::copy_from_bytes(&bytes[..len]).unwrap_err();
        prop_assert!(
            matches!(err, FormatError::TooShort { .. } | FormatError::Truncated { .. }),
            "unexpected error {:?}",
            err
        );
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let res = std::panic::catch_unwind(|| {
            let _ = decode::<Prim>(&bytes);
            let _ = RecordView::<[u8; 4]>::with_limits(&bytes, &Limits::new(16));
            ActivityStream::<Prim>::new(&bytes).count()
        });
        prop_assert!(res.is_ok(), "decode panicked (len={})", bytes.len());
    }

    #[test]
    fn stream_walks_every_record(records in proptest::collection::vec(record(), 0..8)) {
        let bytes = encode_stream(&records);

        let views: Vec<_> = ActivityStream::<Prim>::new(&bytes)
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(views.len(), records.len());
        for (view, record) in views.iter().zip(&records) {
            prop_assert_eq!(view.as_bytes(), record.as_bytes());
        }

        prop_assert_eq!(decode_stream::<Prim>(&bytes).unwrap(), records);
    }
}

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use dtlv_decoder::{
    DecodeConfig, DecodePipeline, OversizePolicy, RawInput, RecordLayout, StorageMode,
    StoreFullPolicy, TruncatedInputPolicy, UnknownTagPolicy,
};
use dtlv_types::CapacityTable;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzConfig {
    max_records: u8,
    skip_unknown: bool,
    truncate_oversize: bool,
    keep_on_truncation: bool,
    short_layout: bool,
    count_prefix: bool,
    per_tag_slot: bool,
    evict_oldest: bool,
    journal: Option<u16>,
}

impl FuzzConfig {
    fn into_config(self) -> DecodeConfig {
        DecodeConfig {
            max_records: usize::from(self.max_records % 32),
            on_unknown_tag: if self.skip_unknown {
                UnknownTagPolicy::Skip
            } else {
                UnknownTagPolicy::RejectAll
            },
            on_oversized_payload: if self.truncate_oversize {
                OversizePolicy::Truncate
            } else {
                OversizePolicy::Reject
            },
            on_truncated_input: if self.keep_on_truncation {
                TruncatedInputPolicy::StopAndKeepAccepted
            } else {
                TruncatedInputPolicy::RejectAll
            },
            layout: if self.short_layout {
                RecordLayout::TagLength
            } else {
                RecordLayout::TagIdLength
            },
            count_prefix: self.count_prefix,
            storage: if self.per_tag_slot {
                StorageMode::PerTagSlot
            } else {
                StorageMode::Sequential
            },
            on_store_full: if self.evict_oldest {
                StoreFullPolicy::EvictOldest
            } else {
                StoreFullPolicy::Reject
            },
            journal_capacity: self.journal.map(usize::from),
        }
    }
}

// Fuzz target: DecodePipeline under arbitrary policies and input.
//
// The pipeline must never panic, must never store more than its limit,
// and must never store a payload larger than the tag's capacity. Two
// calls run back to back so state carried between calls is exercised.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(config) = FuzzConfig::arbitrary(&mut u) else {
        return;
    };
    let input = u.take_rest();

    let config = config.into_config();
    let max_records = config.max_records;
    let mut pipeline = DecodePipeline::with_config(config);
    let table = CapacityTable::automotive();

    for _ in 0..2 {
        let report = pipeline.decode(RawInput::from(input));
        assert_eq!(report.bytes_consumed + report.trailing_bytes, input.len());
        assert!(pipeline.store().len() <= max_records);
        for record in pipeline.store().iter() {
            let max = table.lookup(record.tag()).expect("stored tag is known");
            assert!(record.len() <= max);
        }
    }
});

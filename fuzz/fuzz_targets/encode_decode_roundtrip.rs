#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use dtlv_decoder::{DecodeConfig, DecodePipeline, RawInput, Termination};
use dtlv_encoder::RecordEncoder;
use dtlv_types::{CapacityTable, RecordTag};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzRecord {
    tag_index: u8,
    id: u16,
    payload: Vec<u8>,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    records: Vec<FuzzRecord>,
    count_prefix: bool,
}

// Fuzz target: RecordEncoder -> DecodePipeline roundtrip.
//
// Encodes records with known tags, decodes them, and checks that every
// record is stored with its payload clipped to the tag's capacity.
fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(input) = FuzzInput::arbitrary(&mut u) else {
        return;
    };

    let records = &input.records[..input.records.len().min(64)];
    let mut encoder = RecordEncoder::new();
    if input.count_prefix {
        encoder.with_count_prefix();
    }
    let tags: Vec<RecordTag> = records
        .iter()
        .map(|r| RecordTag::KNOWN[usize::from(r.tag_index) % RecordTag::KNOWN.len()])
        .collect();
    for (record, tag) in records.iter().zip(&tags) {
        encoder.add_record(tag.wire_id(), record.id, &record.payload);
    }
    let Ok(bytes) = encoder.encode() else {
        return;
    };

    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        count_prefix: input.count_prefix,
        ..DecodeConfig::default()
    });
    let report = pipeline.decode(RawInput::from(&bytes));
    assert_eq!(report.termination, Termination::Complete, "{report}");
    assert_eq!(report.accepted, records.len());

    let table = CapacityTable::automotive();
    for ((record, tag), stored) in records.iter().zip(&tags).zip(pipeline.store().iter()) {
        let max = usize::from(table.lookup(tag.wire_id()).unwrap());
        let keep = record.payload.len().min(max);
        assert_eq!(stored.payload(), &record.payload[..keep]);
        assert_eq!(stored.id(), Some(record.id));
    }
});

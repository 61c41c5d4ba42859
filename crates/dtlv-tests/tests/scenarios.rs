//! End-to-end decode scenarios against the automotive capacity table.
//!
//! Each test builds a message with [`RecordEncoder`] (or by hand where the
//! encoder refuses to produce the input), decodes it through a
//! [`DecodePipeline`], and checks the report together with what landed in
//! the store.

use dtlv_decoder::{
    DecodeConfig, DecodeError, DecodePipeline, RawInput, StorageMode, StoreFullPolicy,
    StoredRecord, Termination, TruncatedInputPolicy,
};
use dtlv_encoder::RecordEncoder;
use dtlv_types::{CapacityTable, RecordTag};
use dtlv_wire::frame::tag;

fn dtcs(n: u16) -> Vec<u8> {
    let mut encoder = RecordEncoder::new();
    for i in 0..n {
        encoder.add_dtc(i, &i.to_be_bytes());
    }
    encoder.encode().unwrap()
}

fn ids(pipeline: &DecodePipeline) -> Vec<u16> {
    pipeline.store().iter().filter_map(StoredRecord::id).collect()
}

// ── Basic acceptance ──────────────────────────────────────────────────────────

#[test]
fn single_calibration_record_is_stored() {
    let input = [0x01u8, 0x00, 0x01, 0x00, 0x05, 0x11, 0x22, 0x33, 0x44, 0x55];
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&input));

    assert_eq!(report.termination, Termination::Complete);
    assert_eq!(report.accepted, 1);
    assert!(report.is_clean());
    let record = pipeline.store().get(0).unwrap();
    assert_eq!(record.record_tag(), RecordTag::CalibrationA);
    assert_eq!(record.id(), Some(1));
    assert_eq!(record.payload(), &[0x11, 0x22, 0x33, 0x44, 0x55]);
    assert_eq!(record.capacity(), 64);
}

#[test]
fn mixed_message_preserves_input_order() {
    let bytes = RecordEncoder::new()
        .add_calibration(RecordTag::CalibrationB, &[0xC0; 100])
        .add_dtc(0x0101, b"P0301")
        .add_sensor_payload(4, &[0x55; 200])
        .add_firmware_chunk(0, &[0xEE; 256])
        .add_did_data(0xF190, b"WVWZZZ1JZXW000001")
        .encode()
        .unwrap();
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::Complete);
    assert_eq!(report.accepted, 5);
    // The 17-byte VIN is clipped to the 16-byte DID slot.
    assert_eq!(report.truncated, 1);
    assert_eq!(report.bytes_consumed, bytes.len());

    let tags: Vec<RecordTag> = pipeline.store().iter().map(StoredRecord::record_tag).collect();
    assert_eq!(
        tags,
        [
            RecordTag::CalibrationB,
            RecordTag::DtcLog,
            RecordTag::SensorPayload,
            RecordTag::FirmwareChunk,
            RecordTag::DidData,
        ]
    );
    let did = pipeline.store().find(tag::DID_DATA).unwrap();
    assert_eq!(did.payload(), b"WVWZZZ1JZXW00000");
    assert_eq!(did.declared_len(), 17);
    assert!(did.was_truncated());
}

// ── Truncation ────────────────────────────────────────────────────────────────

#[test]
fn length_past_end_copies_nothing() {
    let mut input = vec![0x01u8, 0x00, 0x01, 0x01, 0x2C];
    input.extend_from_slice(&[0xAB; 10]);
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&input));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert_eq!(report.accepted, 0);
    assert!(pipeline.store().is_empty());
    let failure = report.failure.as_ref().unwrap();
    assert!(failure.is_truncation());
    assert!(matches!(failure, DecodeError::Wire(_)));
}

#[test]
fn records_before_truncation_are_kept() {
    let mut bytes = dtcs(3);
    bytes.extend_from_slice(&[tag::DTC_LOG, 0x00, 0x09, 0x00, 0x40, 0x01]);
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.bytes_consumed, bytes.len() - 6);
    assert_eq!(report.trailing_bytes, 6);
    assert_eq!(ids(&pipeline), [0, 1, 2]);
}

#[test]
fn truncation_with_reject_all_stores_nothing() {
    let mut bytes = dtcs(3);
    bytes.extend_from_slice(&[tag::DTC_LOG, 0x00]);
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        on_truncated_input: TruncatedInputPolicy::RejectAll,
        ..DecodeConfig::default()
    });

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert_eq!(report.accepted, 0);
    assert_eq!(report.rejected, 3);
    assert!(pipeline.store().is_empty());
}

// ── Capacity ──────────────────────────────────────────────────────────────────

#[test]
fn six_records_into_five_slots() {
    let bytes = dtcs(6);
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        max_records: 5,
        ..DecodeConfig::default()
    });

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::CapacityFull);
    assert_eq!(report.accepted, 5);
    assert_eq!(report.rejected, 1);
    assert_eq!(pipeline.store().len(), 5);
    assert_eq!(ids(&pipeline), [0, 1, 2, 3, 4]);
    assert!(report.failure.as_ref().unwrap().is_capacity());
}

#[test]
fn evict_oldest_keeps_latest_records() {
    let bytes = dtcs(7);
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        max_records: 5,
        on_store_full: StoreFullPolicy::EvictOldest,
        ..DecodeConfig::default()
    });

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::Complete);
    assert_eq!(report.accepted, 7);
    assert_eq!(report.evicted, 2);
    assert_eq!(ids(&pipeline), [2, 3, 4, 5, 6]);
}

#[test]
fn store_fills_across_calls() {
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        max_records: 4,
        ..DecodeConfig::default()
    });

    let first = pipeline.decode(RawInput::from(&dtcs(3)));
    assert_eq!(first.termination, Termination::Complete);

    let second = pipeline.decode(RawInput::from(&dtcs(3)));
    assert_eq!(second.termination, Termination::CapacityFull);
    assert_eq!(second.accepted, 1);
    assert_eq!(second.rejected, 2);
    assert_eq!(ids(&pipeline), [0, 1, 2, 0]);

    pipeline.clear();
    assert!(pipeline.store().is_empty());
    let third = pipeline.decode(RawInput::from(&dtcs(3)));
    assert!(third.is_clean());
}

#[test]
fn per_tag_slot_keeps_last_value_per_tag() {
    let bytes = RecordEncoder::new()
        .add_did_data(0xF190, b"first")
        .add_dtc(1, b"P0100")
        .add_did_data(0xF191, b"second")
        .encode()
        .unwrap();
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        storage: StorageMode::PerTagSlot,
        ..DecodeConfig::default()
    });

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.accepted, 3);
    assert_eq!(pipeline.store().len(), 2);
    let did = pipeline.store().find(tag::DID_DATA).unwrap();
    assert_eq!(did.id(), Some(0xF191));
    assert_eq!(did.payload(), b"second");
}

// ── Custom tables ─────────────────────────────────────────────────────────────

#[test]
fn custom_table_narrows_accepted_tags() {
    let table = CapacityTable::builder()
        .with_tag(RecordTag::DtcLog, 4)
        .build()
        .unwrap();
    let bytes = RecordEncoder::new()
        .add_dtc(1, b"P0301")
        .add_did_data(0xF190, b"x")
        .encode()
        .unwrap();
    let mut pipeline = DecodePipeline::new(table, DecodeConfig::default());

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::Complete);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.truncated, 1);
    assert_eq!(report.skipped_unknown, 1);
    assert_eq!(pipeline.store().get(0).unwrap().payload(), b"P030");
}

// ── Sink ──────────────────────────────────────────────────────────────────────

#[test]
fn sink_sees_each_committed_record() {
    let bytes = RecordEncoder::new()
        .add_dtc(1, b"a")
        .add_record(0x99, 2, b"unknown")
        .add_dtc(3, b"c")
        .encode()
        .unwrap();
    let mut pipeline = DecodePipeline::default();
    let mut seen = Vec::new();

    let report = pipeline.decode_with_sink(RawInput::from(&bytes), &mut |record: &StoredRecord| {
        seen.push((record.id(), record.payload().to_vec()));
    });

    assert_eq!(report.accepted, 2);
    assert_eq!(seen, [(Some(1), b"a".to_vec()), (Some(3), b"c".to_vec())]);
}

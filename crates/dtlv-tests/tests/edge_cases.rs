//! Edge cases at the boundaries of the record format.
//!
//! - **Empty and tiny inputs**: zero bytes is a complete, empty message;
//!   anything shorter than a header is truncated input.
//! - **Count prefix**: a missing or short prefix, a zero count, and a count
//!   larger than the records actually present.
//! - **Declared lengths**: the caller-declared input length is checked
//!   against the real buffer before any byte is read.
//! - **Extreme field values**: `0xFFFF` lengths and zero-length payloads.
//! - **Journal limits**: a journal that runs out of room ends the call.

use dtlv_decoder::{
    DecodeConfig, DecodeError, DecodePipeline, DecoderState, RawInput, RecordDecoder,
    RecordLayout, Termination,
};
use dtlv_encoder::RecordEncoder;
use dtlv_wire::WireError;
use dtlv_wire::frame::tag;

fn prefixed() -> DecodeConfig {
    DecodeConfig {
        count_prefix: true,
        ..DecodeConfig::default()
    }
}

// ── Empty and tiny inputs ─────────────────────────────────────────────────────

#[test]
fn empty_input_is_complete() {
    let mut pipeline = DecodePipeline::default();
    let report = pipeline.decode(RawInput::from(&[0u8; 0]));

    assert!(report.is_clean());
    assert_eq!(report.accepted, 0);
    assert_eq!(report.bytes_consumed, 0);
    assert_eq!(report.trailing_bytes, 0);
}

#[test]
fn partial_header_is_truncated() {
    let mut pipeline = DecodePipeline::default();
    let report = pipeline.decode(RawInput::from(&[0x01u8, 0x00, 0x01]));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert_eq!(report.trailing_bytes, 3);
    assert_eq!(
        report.failure.unwrap().to_string(),
        "truncated header at offset 0: need 5 bytes, 3 available"
    );
}

#[test]
fn partial_header_after_good_record() {
    let mut bytes = RecordEncoder::new()
        .with_layout(RecordLayout::TagLength)
        .add_record_without_id(tag::CALIBRATION_C, &[0x01, 0x02])
        .encode()
        .unwrap();
    bytes.push(tag::CALIBRATION_C);

    let mut decoder = RecordDecoder::new(RawInput::from(&bytes), RecordLayout::TagLength);
    let first = decoder.next().unwrap().unwrap();
    assert_eq!(first.payload(), &[0x01, 0x02]);
    assert_eq!(first.id(), None);

    let err = decoder.next().unwrap().unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Wire(WireError::TruncatedHeader {
            offset: 5,
            needed: 3,
            available: 1,
        })
    ));
    assert_eq!(decoder.state(), DecoderState::Malformed);
    assert!(decoder.next().is_none());
}

// ── Count prefix ──────────────────────────────────────────────────────────────

#[test]
fn one_byte_count_prefix_is_truncated() {
    let mut pipeline = DecodePipeline::with_config(prefixed());
    let report = pipeline.decode(RawInput::from(&[0x00u8]));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert_eq!(report.declared_count, None);
    assert_eq!(report.trailing_bytes, 1);
}

#[test]
fn zero_count_reads_nothing() {
    let mut bytes = vec![0x00u8, 0x00];
    bytes.extend_from_slice(&[tag::DTC_LOG, 0x00, 0x01, 0x00, 0x01, 0xFF]);
    let mut pipeline = DecodePipeline::with_config(prefixed());

    let report = pipeline.decode(RawInput::from(&bytes));

    assert!(report.is_clean());
    assert_eq!(report.declared_count, Some(0));
    assert_eq!(report.accepted, 0);
    assert_eq!(report.bytes_consumed, 2);
    assert_eq!(report.trailing_bytes, 6);
}

#[test]
fn count_larger_than_records_present_ends_at_input() {
    let mut bytes = RecordEncoder::new()
        .with_count_prefix()
        .add_dtc(1, b"a")
        .add_dtc(2, b"b")
        .encode()
        .unwrap();
    bytes[1] = 5;
    let mut pipeline = DecodePipeline::with_config(prefixed());

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::Complete);
    assert_eq!(report.declared_count, Some(5));
    assert_eq!(report.accepted, 2);
}

// ── Declared input length ─────────────────────────────────────────────────────

#[test]
fn declared_length_beyond_buffer_is_refused() {
    let bytes = RecordEncoder::new().add_dtc(1, b"x").encode().unwrap();
    let mut pipeline = DecodePipeline::default();

    let err = pipeline.decode_declared(&bytes, bytes.len() + 1).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::DeclaredLengthExceedsBuffer { declared: 7, actual: 6 }
    ));
    assert!(pipeline.store().is_empty());
}

#[test]
fn declared_length_hides_tail() {
    let bytes = RecordEncoder::new()
        .add_dtc(1, b"keep")
        .add_dtc(2, b"hidden")
        .encode()
        .unwrap();
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode_declared(&bytes, 9).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.accepted, 1);
    assert_eq!(pipeline.store().get(0).unwrap().payload(), b"keep");
}

// ── Extreme field values ──────────────────────────────────────────────────────

#[test]
fn max_declared_length_on_short_input() {
    let input = [tag::SENSOR_PAYLOAD, 0x00, 0x01, 0xFF, 0xFF, 0x00, 0x00];
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&input));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert!(pipeline.store().is_empty());
    assert!(matches!(
        report.failure,
        Some(DecodeError::Wire(WireError::TruncatedPayload {
            offset: 5,
            declared: 0xFFFF,
            available: 2,
        }))
    ));
}

#[test]
fn zero_length_payload_is_accepted() {
    let bytes = RecordEncoder::new()
        .add_dtc(1, &[])
        .add_dtc(2, &[0x01])
        .encode()
        .unwrap();
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&bytes));

    assert!(report.is_clean());
    assert_eq!(report.accepted, 2);
    let empty = pipeline.store().get(0).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.capacity(), 64);
}

#[test]
fn unknown_tag_with_huge_length_still_truncates() {
    // Framing is checked before the tag is looked up.
    let input = [0x7Fu8, 0x00, 0x00, 0x10, 0x00, 0x01];
    let mut pipeline = DecodePipeline::default();

    let report = pipeline.decode(RawInput::from(&input));

    assert_eq!(report.termination, Termination::TruncatedInput);
    assert_eq!(report.skipped_unknown, 0);
}

// ── Journal limits ────────────────────────────────────────────────────────────

#[test]
fn journal_overflow_stops_before_store() {
    let bytes = RecordEncoder::new()
        .add_dtc(1, &[0xAA; 10])
        .add_dtc(2, &[0xBB; 10])
        .encode()
        .unwrap();
    // Room for the prefix and one 15-byte frame only.
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        journal_capacity: Some(20),
        ..DecodeConfig::default()
    });

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::CapacityFull);
    assert_eq!(report.accepted, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(pipeline.store().len(), 1);
    assert_eq!(pipeline.journal().unwrap().len(), 17);
}

#[test]
fn zero_record_store_rejects_everything() {
    let bytes = RecordEncoder::new().add_dtc(1, b"x").encode().unwrap();
    let mut pipeline = DecodePipeline::with_config(DecodeConfig {
        max_records: 0,
        ..DecodeConfig::default()
    });

    let report = pipeline.decode(RawInput::from(&bytes));

    assert_eq!(report.termination, Termination::CapacityFull);
    assert_eq!(report.rejected, 1);
}

//! Golden fixture generator for the DTLV conformance suite.
//!
//! Writes every fixture under `tests/golden/` as a single line of lowercase
//! hex. Run it after a wire-format change, then re-run the conformance
//! tests and review the inline snapshots that moved.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_golden -p dtlv-tests
//! ```
//!
//! # Generated fixtures
//!
//! | File                   | Contents                                       |
//! |------------------------|------------------------------------------------|
//! | single_record.hex      | One calibration_a record, 5-byte payload        |
//! | count_prefixed.hex     | Count prefix of 2, DTC + DID, 2 trailing bytes  |
//! | unknown_tag.hex        | calibration_a, tag 0x7F, calibration_b          |
//! | oversized_payload.hex  | calibration_c with 33 bytes against a 32 limit  |
//! | truncated_payload.hex  | Handcrafted: declares 300 bytes, carries 10     |

#![allow(clippy::pedantic)]

use std::path::{Path, PathBuf};

use dtlv_encoder::RecordEncoder;
use dtlv_wire::frame::tag;

fn main() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let golden_dir = manifest_dir.join("tests/golden");

    generate_single_record(&golden_dir);
    generate_count_prefixed(&golden_dir);
    generate_unknown_tag(&golden_dir);
    generate_oversized_payload(&golden_dir);
    generate_truncated_payload(&golden_dir);

    println!("All golden fixtures written to {}", golden_dir.display());
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) {
    std::fs::create_dir_all(dir).expect("create_dir_all");
    let path = dir.join(format!("{name}.hex"));
    let mut text = hex::encode(bytes);
    text.push('\n');
    std::fs::write(&path, text).expect("write fixture");
    println!("  wrote {} ({} bytes)", path.display(), bytes.len());
}

// ── Fixture generators ────────────────────────────────────────────────────────

fn generate_single_record(dir: &Path) {
    let bytes = RecordEncoder::new()
        .add_record(tag::CALIBRATION_A, 1, &[0x11, 0x22, 0x33, 0x44, 0x55])
        .encode()
        .expect("encode single_record");
    write_fixture(dir, "single_record", &bytes);
}

fn generate_count_prefixed(dir: &Path) {
    let mut bytes = RecordEncoder::new()
        .with_count_prefix()
        .add_dtc(7, &[0xAA, 0xBB, 0xCC])
        .add_did_data(0xF001, &[0x01, 0x02])
        .encode()
        .expect("encode count_prefixed");
    // Bytes past the declared count must be left unread.
    bytes.extend_from_slice(&[0xDE, 0xAD]);
    write_fixture(dir, "count_prefixed", &bytes);
}

fn generate_unknown_tag(dir: &Path) {
    let bytes = RecordEncoder::new()
        .add_record(tag::CALIBRATION_A, 1, &[0xAA, 0xAA])
        .add_record(0x7F, 2, &[0x01, 0x02, 0x03])
        .add_record(tag::CALIBRATION_B, 3, &[0xFF])
        .encode()
        .expect("encode unknown_tag");
    write_fixture(dir, "unknown_tag", &bytes);
}

fn generate_oversized_payload(dir: &Path) {
    let bytes = RecordEncoder::new()
        .add_record(tag::CALIBRATION_C, 9, &[0x5A; 33])
        .encode()
        .expect("encode oversized_payload");
    write_fixture(dir, "oversized_payload", &bytes);
}

fn generate_truncated_payload(dir: &Path) {
    // The encoder cannot produce a short payload, so the frame is built by
    // hand: tag 0x01, id 1, declared length 300, then only 10 bytes.
    let mut bytes = vec![tag::CALIBRATION_A, 0x00, 0x01, 0x01, 0x2C];
    bytes.extend_from_slice(&[0x00; 10]);
    write_fixture(dir, "truncated_payload", &bytes);
}

//! Shared helpers for the DTLV integration tests and benchmarks.

#![warn(clippy::pedantic)]

use std::path::Path;

use dtlv_decoder::RecordStore;

/// Read `tests/golden/<name>.hex` and decode it to bytes.
///
/// # Panics
///
/// Panics if the fixture is missing or is not valid hex; fixtures are
/// committed alongside the tests.
#[must_use]
pub fn golden(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(format!("{name}.hex"));
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()));
    hex::decode(text.trim())
        .unwrap_or_else(|e| panic!("golden fixture {} is not hex: {e}", path.display()))
}

/// One line per stored record, for snapshot comparison.
///
/// ```text
/// dtc_log 0x10 id=7 len=3/3 aabbcc
/// ```
#[must_use]
pub fn render_store(store: &RecordStore) -> String {
    store
        .iter()
        .map(|record| {
            let id = record
                .id()
                .map_or_else(|| "-".to_string(), |id| id.to_string());
            format!(
                "{} {:#04x} id={id} len={}/{} {}",
                record.record_tag().name(),
                record.tag(),
                record.len(),
                record.declared_len(),
                hex::encode(record.payload()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

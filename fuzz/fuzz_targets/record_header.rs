#![no_main]

use dtlv_wire::header::{read_count_prefix, RecordHeader, RecordLayout};
use libfuzzer_sys::fuzz_target;

// Fuzz target: RecordHeader::read_at and read_count_prefix with arbitrary
// bytes and offsets.
//
// Catches bugs in:
// - Offset arithmetic near usize::MAX
// - Short-input handling for both layouts
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let offset = usize::from(selector) % (rest.len() + 2);

    for layout in [RecordLayout::TagIdLength, RecordLayout::TagLength] {
        if let Ok(header) = RecordHeader::read_at(rest, offset, layout) {
            assert!(offset + layout.header_size() <= rest.len());
            assert_eq!(header.id.is_some(), layout.has_id());
        }
    }
    let _ = RecordHeader::read_at(rest, usize::MAX, RecordLayout::TagIdLength);
    let _ = read_count_prefix(rest);
});

#![no_main]

use dtlv_wire::{RecordFrame, RecordLayout};
use libfuzzer_sys::fuzz_target;

// Fuzz target: RecordFrame write->read roundtrip.
//
// Input format:
//   byte 0:     tag
//   bytes 1..3: id (big-endian)
//   byte 3:     layout selector
//   bytes 4..:  payload
//
// Writes the frame, reads it back, and asserts the output matches.
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let layout = if data[3] & 1 == 0 {
        RecordLayout::TagIdLength
    } else {
        RecordLayout::TagLength
    };
    let frame = RecordFrame {
        tag: data[0],
        id: layout
            .has_id()
            .then(|| u16::from_be_bytes([data[1], data[2]])),
        payload: data[4..].to_vec(),
    };

    let mut wire = Vec::new();
    let Ok(written) = frame.write_to(layout, &mut wire) else {
        return;
    };
    assert_eq!(written, wire.len());

    let (parsed, consumed) = RecordFrame::read_from(&wire, layout).unwrap();
    assert_eq!(parsed, frame);
    assert_eq!(consumed, wire.len());
});

#![no_main]

use dtlv_decoder::{DecoderState, RawInput, RecordDecoder, RecordLayout};
use libfuzzer_sys::fuzz_target;

// Fuzz target: RecordDecoder over arbitrary bytes.
//
// First byte selects the layout and whether a count prefix is read.
// Every yielded view must lie inside the input, and the decoder must end
// in a terminal state.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, input)) = data.split_first() else {
        return;
    };
    let layout = if selector & 1 == 0 {
        RecordLayout::TagIdLength
    } else {
        RecordLayout::TagLength
    };

    let mut decoder = if selector & 2 == 0 {
        RecordDecoder::new(RawInput::from(input), layout)
    } else {
        match RecordDecoder::with_count_prefix(RawInput::from(input), layout) {
            Ok(decoder) => decoder,
            Err(_) => return,
        }
    };

    for item in decoder.by_ref() {
        match item {
            Ok(record) => {
                let end = record.offset() + layout.header_size() + record.payload().len();
                assert!(end <= input.len());
            }
            Err(_) => break,
        }
    }

    assert!(decoder.state().is_terminal());
    assert!(decoder.next().is_none());
    assert!(matches!(
        decoder.state(),
        DecoderState::Done | DecoderState::Malformed
    ));
});

use dtlv_store::StoredRecord;

/// Consumer of committed records.
///
/// A sink sees each record once, in input order, right after it has been
/// copied into the store. It gets the stored copy, so the payload it sees
/// is already bounded by the tag's capacity.
///
/// Any `FnMut(&StoredRecord)` closure is a sink:
///
/// ```rust
/// use dtlv_decoder::{DecodePipeline, RawInput, StoredRecord};
///
/// let input = [0x10u8, 0x00, 0x01, 0x00, 0x01, 0x42];
/// let mut pipeline = DecodePipeline::default();
/// let mut seen = Vec::new();
/// pipeline.decode_with_sink(RawInput::from(&input), &mut |r: &StoredRecord| {
///     seen.push(r.tag());
/// });
/// assert_eq!(seen, vec![0x10]);
/// ```
pub trait RecordSink {
    fn accept(&mut self, record: &StoredRecord);
}

impl<F> RecordSink for F
where
    F: FnMut(&StoredRecord),
{
    fn accept(&mut self, record: &StoredRecord) {
        self(record);
    }
}

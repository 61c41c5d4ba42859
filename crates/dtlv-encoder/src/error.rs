use dtlv_wire::WireError;

/// Errors that can occur while building a record message.
///
/// The encoder checks everything the wire format cannot express before
/// writing a single byte, so a failed `.encode()` never yields a
/// half-written message.
///
/// Error hierarchy:
///
/// ```text
///   EncodeError
///   ├── PayloadTooLarge     ← payload longer than the 16-bit length field
///   ├── TooManyRecords      ← more records than the 16-bit count prefix
///   ├── IdNotRepresentable  ← record id set, but the layout has no id field
///   └── Wire(WireError)     ← from dtlv-wire serialization
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("payload for tag {tag:#04X} is {len} bytes, wire limit is {limit}")]
    PayloadTooLarge { tag: u8, len: usize, limit: usize },

    #[error("{count} records do not fit the 16-bit count prefix")]
    TooManyRecords { count: usize },

    #[error("record {index} (tag {tag:#04X}) has an id but the layout carries none")]
    IdNotRepresentable { index: usize, tag: u8 },

    #[error(transparent)]
    Wire(#[from] WireError),
}

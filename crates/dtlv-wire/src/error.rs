/// Errors raised while reading or writing the record wire format.
///
/// Every variant that comes from reading untrusted input carries the
/// absolute byte offset at which the problem was detected, so a
/// diagnostic can point at the exact spot in a captured CAN/UDS dump.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Fewer bytes remain than a fixed-size header (or count prefix) needs.
    #[error("truncated header at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedHeader {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The declared payload length runs past the end of the input.
    ///
    /// This is the out-of-bounds read the whole format is built to
    /// refuse: no payload byte is ever copied when this is returned.
    #[error(
        "truncated payload at offset {offset}: declared {declared} bytes, {available} available"
    )]
    TruncatedPayload {
        offset: usize,
        declared: u16,
        available: usize,
    },

    /// A length does not fit the 16-bit length field.
    #[error("length {len} does not fit a 16-bit length field")]
    LengthOverflow { len: usize },

    /// Destination buffer too small for the bytes being written.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// I/O error during write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

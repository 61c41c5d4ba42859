use dtlv_store::StoreError;
use dtlv_types::TypeError;
use dtlv_wire::WireError;

/// Errors that can occur while decoding a record message.
///
/// Decoding validates at three levels: framing (does the header and the
/// declared payload fit the input), meaning (does the capacity table know
/// the tag), and storage (is there room). Each level has its own error
/// type; this enum wraps them so one `?` carries any of them up.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── DeclaredLengthExceedsBuffer ← caller-declared input length > slice
///   ├── Wire(WireError)             ← truncated header / payload
///   ├── Type(TypeError)             ← unknown tag
///   └── Store(StoreError)           ← store or journal full, oversized payload
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The caller claimed more input than the slice actually holds.
    ///
    /// The declared length is never trusted; construction of the
    /// [`RawInput`](crate::RawInput) fails instead.
    #[error("declared input length {declared} exceeds buffer of {actual} bytes")]
    DeclaredLengthExceedsBuffer { declared: usize, actual: usize },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DecodeError {
    /// Whether this error means the input ended before a header or
    /// payload it announced.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::Wire(WireError::TruncatedHeader { .. } | WireError::TruncatedPayload { .. })
        )
    }

    /// Whether this error means the store or journal ran out of room.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_capacity())
    }
}

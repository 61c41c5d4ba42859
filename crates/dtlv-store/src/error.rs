use dtlv_types::TypeError;

/// Errors from the bounded storage layer.
///
/// Every operation that returns one of these has left its target
/// unchanged: no partial copy, no moved cursor, no evicted record.
///
/// ```text
///   StoreError
///   ├── CapacityExceeded    ← byte buffer has no room for the append
///   ├── RecordLimitReached  ← record store already holds max_records
///   ├── OversizedPayload    ← payload longer than the tag's limit (Reject policy)
///   ├── PatchOutOfBounds    ← patch range not inside the written bytes
///   └── Type(TypeError)     ← unknown tag, from the capacity table
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("buffer capacity exceeded: {requested} bytes requested, cursor {cursor} of {capacity}")]
    CapacityExceeded {
        capacity: usize,
        cursor: usize,
        requested: usize,
    },

    #[error("record store full ({max_records} records)")]
    RecordLimitReached { max_records: usize },

    #[error("payload for tag {tag:#04X} is {declared} bytes, limit is {max}")]
    OversizedPayload { tag: u8, declared: usize, max: u16 },

    #[error("patch of {len} bytes at offset {offset} outside written range 0..{cursor}")]
    PatchOutOfBounds {
        offset: usize,
        len: usize,
        cursor: usize,
    },

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl StoreError {
    /// Whether this error means "out of room", as opposed to a problem
    /// with the record itself.
    #[must_use]
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::RecordLimitReached { .. }
        )
    }
}

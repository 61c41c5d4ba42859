use dtlv_store::{OversizePolicy, StorageMode, StoreFullPolicy};
use dtlv_wire::RecordLayout;

/// Configuration for a [`DecodePipeline`](crate::DecodePipeline).
///
/// Every policy choice the pipeline makes is named here; nothing is
/// inferred per record.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────┐
/// │ Field                │ Purpose                                      │
/// ├──────────────────────┼──────────────────────────────────────────────┤
/// │ max_records          │ Store capacity in records                    │
/// │ on_unknown_tag       │ Skip the record, or reject the whole message │
/// │ on_oversized_payload │ Clip to the tag's limit, or reject the record│
/// │ on_truncated_input   │ Keep what came before, or reject everything  │
/// │ layout               │ 5-byte [tag][id][len] or 3-byte [tag][len]   │
/// │ count_prefix         │ Message starts with a 2-byte record count    │
/// │ storage              │ Sequential buffers or one slot per tag       │
/// │ on_store_full        │ Reject further records, or evict the oldest  │
/// │ journal_capacity     │ Size of the re-encoded journal, if any       │
/// └──────────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Maximum number of records the store holds.
    pub max_records: usize,

    pub on_unknown_tag: UnknownTagPolicy,

    /// Applied uniformly to every record whose declared length exceeds
    /// its tag's capacity.
    pub on_oversized_payload: OversizePolicy,

    pub on_truncated_input: TruncatedInputPolicy,

    pub layout: RecordLayout,

    /// Whether the message begins with a big-endian `u16` record count.
    pub count_prefix: bool,

    pub storage: StorageMode,

    /// Only consulted in [`StorageMode::Sequential`]; a per-tag slot store
    /// overwrites instead of evicting.
    pub on_store_full: StoreFullPolicy,

    /// Byte capacity of the journal. `None` disables it.
    pub journal_capacity: Option<usize>,
}

impl Default for DecodeConfig {
    /// Five-byte headers, no count prefix, 64 records, skip unknown tags,
    /// truncate oversized payloads, keep records accepted before a
    /// truncation, sequential storage that rejects when full, no journal.
    fn default() -> Self {
        Self {
            max_records: 64,
            on_unknown_tag: UnknownTagPolicy::default(),
            on_oversized_payload: OversizePolicy::default(),
            on_truncated_input: TruncatedInputPolicy::default(),
            layout: RecordLayout::default(),
            count_prefix: false,
            storage: StorageMode::default(),
            on_store_full: StoreFullPolicy::default(),
            journal_capacity: None,
        }
    }
}

/// What to do with a record whose tag has no capacity entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownTagPolicy {
    /// Step over it using its declared length and keep going.
    #[default]
    Skip,
    /// Reject the whole message; nothing from it is stored.
    RejectAll,
}

/// What to do when the input ends inside a header or payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TruncatedInputPolicy {
    /// Store the records that were complete before the truncation.
    #[default]
    StopAndKeepAccepted,
    /// Treat the message as corrupt and store nothing from it.
    RejectAll,
}

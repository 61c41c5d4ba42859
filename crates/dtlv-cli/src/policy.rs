//! Decode policy flags shared by `inspect` and `validate`.

use clap::ValueEnum;
use dtlv_decoder::{
    DecodeConfig, OversizePolicy, RecordLayout, StorageMode, StoreFullPolicy,
    TruncatedInputPolicy, UnknownTagPolicy,
};

/// ```text
/// ┌────────────────┬──────────────────────────────────┬──────────────────┐
/// │ Flag           │ Values                           │ Default          │
/// ├────────────────┼──────────────────────────────────┼──────────────────┤
/// │ --layout       │ tag-id-length | tag-length       │ tag-id-length    │
/// │ --count-prefix │ (switch)                         │ off              │
/// │ --max-records  │ N                                │ 64               │
/// │ --on-unknown   │ skip | reject-all                │ skip             │
/// │ --on-oversize  │ truncate | reject                │ truncate         │
/// │ --on-truncated │ keep | reject-all                │ keep             │
/// │ --storage      │ sequential | per-tag-slot        │ sequential       │
/// │ --on-full      │ reject | evict-oldest            │ reject           │
/// │ --journal      │ capacity in bytes                │ none             │
/// └────────────────┴──────────────────────────────────┴──────────────────┘
/// ```
#[derive(clap::Args, Debug)]
pub struct PolicyArgs {
    /// Record header layout.
    #[arg(long, value_enum, default_value_t = LayoutArg::TagIdLength)]
    pub layout: LayoutArg,

    /// The message starts with a two-byte record count.
    #[arg(long)]
    pub count_prefix: bool,

    /// Store capacity in records.
    #[arg(long, default_value_t = 64)]
    pub max_records: usize,

    #[arg(long, value_enum, default_value_t = UnknownArg::Skip)]
    pub on_unknown: UnknownArg,

    #[arg(long, value_enum, default_value_t = OversizeArg::Truncate)]
    pub on_oversize: OversizeArg,

    #[arg(long, value_enum, default_value_t = TruncatedArg::Keep)]
    pub on_truncated: TruncatedArg,

    #[arg(long, value_enum, default_value_t = StorageArg::Sequential)]
    pub storage: StorageArg,

    #[arg(long, value_enum, default_value_t = FullArg::Reject)]
    pub on_full: FullArg,

    /// Keep a re-encoded journal of this many bytes.
    #[arg(long)]
    pub journal: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LayoutArg {
    TagIdLength,
    TagLength,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum UnknownArg {
    Skip,
    RejectAll,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OversizeArg {
    Truncate,
    Reject,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TruncatedArg {
    Keep,
    RejectAll,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StorageArg {
    Sequential,
    PerTagSlot,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FullArg {
    Reject,
    EvictOldest,
}

impl PolicyArgs {
    pub fn to_config(&self) -> DecodeConfig {
        DecodeConfig {
            max_records: self.max_records,
            on_unknown_tag: match self.on_unknown {
                UnknownArg::Skip => UnknownTagPolicy::Skip,
                UnknownArg::RejectAll => UnknownTagPolicy::RejectAll,
            },
            on_oversized_payload: match self.on_oversize {
                OversizeArg::Truncate => OversizePolicy::Truncate,
                OversizeArg::Reject => OversizePolicy::Reject,
            },
            on_truncated_input: match self.on_truncated {
                TruncatedArg::Keep => TruncatedInputPolicy::StopAndKeepAccepted,
                TruncatedArg::RejectAll => TruncatedInputPolicy::RejectAll,
            },
            layout: self.layout.into(),
            count_prefix: self.count_prefix,
            storage: match self.storage {
                StorageArg::Sequential => StorageMode::Sequential,
                StorageArg::PerTagSlot => StorageMode::PerTagSlot,
            },
            on_store_full: match self.on_full {
                FullArg::Reject => StoreFullPolicy::Reject,
                FullArg::EvictOldest => StoreFullPolicy::EvictOldest,
            },
            journal_capacity: self.journal,
        }
    }
}

impl From<LayoutArg> for RecordLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::TagIdLength => RecordLayout::TagIdLength,
            LayoutArg::TagLength => RecordLayout::TagLength,
        }
    }
}

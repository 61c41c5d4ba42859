#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod sink;

pub use config::{DecodeConfig, TruncatedInputPolicy, UnknownTagPolicy};
pub use decoder::{DecoderState, RecordDecoder};
pub use error::DecodeError;
pub use input::RawInput;
pub use pipeline::{DecodePipeline, DecodeReport, Termination};
pub use sink::RecordSink;

// Re-exported so callers can configure a pipeline from this crate alone.
pub use dtlv_store::{
    OversizePolicy, RecordStore, StorageMode, StoreFullPolicy, StoredRecord,
};
pub use dtlv_wire::RecordLayout;

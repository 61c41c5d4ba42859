#![warn(clippy::pedantic)]

pub mod bounded_buffer;
pub mod error;
pub mod record_store;

pub use bounded_buffer::BoundedBuffer;
pub use error::StoreError;
pub use record_store::{
    OversizePolicy, PutOutcome, RecordStore, StorageMode, StoreFullPolicy, StoredRecord,
};

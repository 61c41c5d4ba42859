#![warn(clippy::pedantic)]

pub mod capacity;
pub mod error;
pub mod record;
pub mod tag;

pub use capacity::{CapacityTable, CapacityTableBuilder};
pub use error::TypeError;
pub use record::DecodedRecord;
pub use tag::RecordTag;

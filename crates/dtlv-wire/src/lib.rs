#![warn(clippy::pedantic)]

pub mod error;
pub mod frame;
pub mod header;

pub use error::WireError;
pub use frame::RecordFrame;
pub use header::{RecordHeader, RecordLayout};

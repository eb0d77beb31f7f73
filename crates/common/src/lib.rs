//! Common types, wire record definitions, and errors shared across `sealed-envelope` crates.

pub mod error;
pub mod protocol;

pub use error::EnvelopeError;
pub use protocol::{Encoding, ErrorReport, Record};

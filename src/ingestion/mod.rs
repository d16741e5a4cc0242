//! Listing seed pipeline - parse a CSV of known rents and load it into PostgreSQL

pub mod parse;
pub mod types;
pub mod write;

pub use types::*;

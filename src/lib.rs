// Library module for testable functions

pub mod analysis;
pub mod api;
pub mod config;
pub mod ingestion;

//! Rent fairness analysis engine - comparables, benchmark statistics and ML estimates

pub mod analyzer;
pub mod artifact;
pub mod benchmark;
pub mod comparables;
pub mod error;
pub mod features;
pub mod predictor;
pub mod store;
pub mod types;
pub mod utils;

pub use analyzer::FairnessAnalyzer;
pub use comparables::{InMemoryListingStore, ListingStore};
pub use error::{EngineError, ModelUnavailable};
pub use predictor::RentPredictor;
pub use store::PgListingStore;
pub use types::*;

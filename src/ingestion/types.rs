//! Core data types for the listing seed pipeline
//! Pure data structures with no behavior

use chrono::{DateTime, Utc};

/// Listing parsed from a seed file, ready to insert into the properties table
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub city: String,
    pub locality: String,
    pub bedrooms: i32,
    pub area_sqft: f64,
    pub rent: i32,
    pub created_at: DateTime<Utc>,
}

/// Parse outcome: good records plus the count of rows that were dropped
#[derive(Debug, Default)]
pub struct ParsedListings {
    pub records: Vec<ListingRecord>,
    pub rejected: usize,
}

/// Write operation statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WriteStats {
    pub inserted: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inserted: {}, skipped: {}, errors: {}",
            self.inserted, self.skipped, self.errors
        )
    }
}

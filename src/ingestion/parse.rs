//! Parse functions - turn seed CSV rows into ListingRecord structs

use crate::analysis::utils::round_half_even;
use crate::ingestion::types::{ListingRecord, ParsedListings};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Seed CSV row structure
#[derive(Debug, Deserialize)]
struct SeedRow {
    city: String,
    locality: String,
    bedrooms: String,
    area_sqft: String,
    rent: String, // may carry a currency symbol and thousands separators
    #[serde(default)]
    created_at: Option<String>,
}

/// Parse a seed CSV file from disk
pub fn parse_listings_file(path: &Path, now: DateTime<Utc>) -> Result<ParsedListings> {
    info!("Parsing listing seed CSV from {:?}", path);
    let file = std::fs::File::open(path)?;
    parse_listings(file, now)
}

/// Parse seed CSV from any reader. Rows without `created_at` are stamped with `now`.
pub fn parse_listings<R: Read>(reader: R, now: DateTime<Utc>) -> Result<ParsedListings> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedListings::default();

    for (idx, result) in reader.deserialize::<SeedRow>().enumerate() {
        let outcome = result
            .map_err(anyhow::Error::from)
            .and_then(|row| parse_seed_row(row, now));

        match outcome {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                parsed.rejected += 1;
                if parsed.rejected <= 10 {
                    // Only log first 10 errors
                    warn!("Skipping row {}: {}", idx + 1, e);
                }
            }
        }
    }

    info!(
        "Parsed {} listings from seed CSV ({} rejected)",
        parsed.records.len(),
        parsed.rejected
    );

    Ok(parsed)
}

fn parse_seed_row(row: SeedRow, now: DateTime<Utc>) -> Result<ListingRecord> {
    let city = row.city.trim().to_string();
    let locality = row.locality.trim().to_string();
    if city.is_empty() || locality.is_empty() {
        return Err(anyhow!("city and locality are required"));
    }

    let bedrooms: i32 = row.bedrooms.trim().parse()?;
    if bedrooms < 1 {
        return Err(anyhow!("bedrooms must be at least 1, got {}", bedrooms));
    }

    let area_sqft: f64 = row.area_sqft.trim().parse()?;
    if !area_sqft.is_finite() || area_sqft <= 0.0 {
        return Err(anyhow!("area_sqft must be positive, got {}", area_sqft));
    }

    let rent = parse_rent(&row.rent)?;

    let created_at = match row.created_at.as_deref().map(str::trim) {
        None | Some("") => now,
        Some(value) => {
            parse_timestamp(value).ok_or_else(|| anyhow!("unrecognised created_at: {}", value))?
        }
    };

    Ok(ListingRecord {
        city,
        locality,
        bedrooms,
        area_sqft,
        rent,
        created_at,
    })
}

/// Parse a rent like "₹18,500" or "18500.4" to whole currency units
fn parse_rent(value: &str) -> Result<i32> {
    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let rent: f64 = clean
        .parse()
        .map_err(|_| anyhow!("rent is not a number: {}", value))?;
    if !rent.is_finite() || rent <= 0.0 || rent > f64::from(i32::MAX) {
        return Err(anyhow!("rent out of range: {}", value));
    }
    Ok(round_half_even(rent) as i32)
}

/// Accepts RFC 3339 timestamps or plain YYYY-MM-DD dates (midnight UTC)
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

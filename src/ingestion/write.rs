//! Write functions - persist seed listings to PostgreSQL, skipping duplicates

use crate::ingestion::types::{ListingRecord, WriteStats};
use anyhow::Result;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Create the properties and predictions tables when they do not exist yet
pub async fn ensure_schema(db: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id SERIAL PRIMARY KEY,
            city TEXT NOT NULL,
            locality TEXT NOT NULL,
            bedrooms INT NOT NULL,
            area_sqft DOUBLE PRECISION NOT NULL,
            rent INT NOT NULL,
            created_at TIMESTAMPTZ DEFAULT NOW()
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS predictions (
            id SERIAL PRIMARY KEY,
            property_id INT NOT NULL,
            predicted_rent DOUBLE PRECISION NOT NULL,
            fairness_score DOUBLE PRECISION NOT NULL,
            is_overpriced BOOLEAN NOT NULL,
            created_at TIMESTAMPTZ DEFAULT NOW()
        )
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_properties_market ON properties (bedrooms, area_sqft)",
    )
    .execute(db)
    .await?;

    debug!("Schema ready");
    Ok(())
}

/// Key identifying the same listing twice in one seed file
fn listing_key(record: &ListingRecord) -> (String, String, i32, u64, i32) {
    (
        record.city.to_lowercase(),
        record.locality.to_lowercase(),
        record.bedrooms,
        record.area_sqft.to_bits(),
        record.rent,
    )
}

/// Drop repeated rows, keeping the first occurrence. Returns the kept rows and how many were dropped.
pub fn dedupe(records: Vec<ListingRecord>) -> (Vec<ListingRecord>, usize) {
    let mut seen = HashSet::new();
    let total = records.len();
    let kept: Vec<ListingRecord> = records
        .into_iter()
        .filter(|record| seen.insert(listing_key(record)))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Write listing records; rows already present in the table are skipped
pub async fn write_listings(db: &PgPool, records: Vec<ListingRecord>) -> Result<WriteStats> {
    info!("Writing {} listing records to database", records.len());

    let (records, duplicates) = dedupe(records);
    let mut stats = WriteStats {
        skipped: duplicates,
        ..WriteStats::default()
    };

    for record in records {
        match write_single_listing(db, &record).await {
            Ok(true) => stats.inserted += 1,
            Ok(false) => stats.skipped += 1,
            Err(e) => {
                warn!(
                    "Failed to write listing {} / {}: {}",
                    record.city, record.locality, e
                );
                stats.errors += 1;
            }
        }
    }

    info!("Write complete: {}", stats);

    Ok(stats)
}

/// Returns true if inserted, false if an identical listing already exists
async fn write_single_listing(db: &PgPool, record: &ListingRecord) -> Result<bool> {
    let existing = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT id FROM properties
        WHERE LOWER(city) = LOWER($1) AND LOWER(locality) = LOWER($2)
          AND bedrooms = $3 AND area_sqft = $4 AND rent = $5
        LIMIT 1
        "#,
    )
    .bind(&record.city)
    .bind(&record.locality)
    .bind(record.bedrooms)
    .bind(record.area_sqft)
    .bind(record.rent)
    .fetch_optional(db)
    .await?;

    if let Some(id) = existing {
        debug!("Skipped listing already stored as id {}", id);
        return Ok(false);
    }

    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO properties (city, locality, bedrooms, area_sqft, rent, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(&record.city)
    .bind(&record.locality)
    .bind(record.bedrooms)
    .bind(record.area_sqft)
    .bind(record.rent)
    .bind(record.created_at)
    .fetch_one(db)
    .await?;

    debug!("Inserted listing {} in {}", id, record.locality);
    Ok(true)
}

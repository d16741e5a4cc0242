//! Listing seeder - parses a CSV of known rents and loads it into the properties table

use anyhow::{Context, Result};
use chrono::Utc;
use rent_fairness::config::Config;
use rent_fairness::ingestion::{parse, write};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    info!("Starting listing seed");

    let config = Config::from_env()?;
    let csv_path: PathBuf = env::args()
        .nth(1)
        .context("usage: seed-listings <listings.csv>")?
        .into();
    let limit_records: usize = env::var("LIMIT_RECORDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0); // 0 = no limit

    let db = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    info!("Step 1/3: Preparing schema...");
    write::ensure_schema(&db).await?;

    info!("Step 2/3: Parsing {}...", csv_path.display());
    let parsed = parse::parse_listings_file(&csv_path, Utc::now())
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;

    let records = if limit_records > 0 {
        let limit = limit_records.min(parsed.records.len());
        warn!("Limiting to first {} records", limit);
        parsed.records.into_iter().take(limit).collect()
    } else {
        parsed.records
    };

    info!("Step 3/3: Writing to database...");
    let mut stats = write::write_listings(&db, records).await?;
    stats.skipped += parsed.rejected;

    info!("✓ Seed complete: {}", stats);

    Ok(())
}

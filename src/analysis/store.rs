//! PostgreSQL-backed listing store

use crate::analysis::comparables::{ComparableQuery, ListingStore};
use crate::analysis::types::{Listing, ListingRow, PredictionRecord};
use crate::analysis::utils::ilike_contains_pattern;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PgListingStore {
    db: PgPool,
}

impl PgListingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingStore for PgListingStore {
    async fn find_listing(&self, id: i32) -> Result<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, city, locality, bedrooms, area_sqft, rent, created_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("Failed to load property {}", id))?;

        Ok(row.map(Listing::from))
    }

    async fn find_comparables(&self, query: &ComparableQuery) -> Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT id, city, locality, bedrooms, area_sqft, rent, created_at
            FROM properties
            WHERE city ILIKE $1
              AND locality ILIKE $2
              AND bedrooms = $3
              AND area_sqft BETWEEN $4 AND $5
            "#,
        )
        .bind(ilike_contains_pattern(&query.city))
        .bind(ilike_contains_pattern(&query.locality))
        .bind(query.bedrooms)
        .bind(query.min_area_sqft)
        .bind(query.max_area_sqft)
        .fetch_all(&self.db)
        .await
        .context("Failed to query comparable properties")?;

        debug!("Comparable query returned {} rows", rows.len());

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn record_prediction(&self, record: &PredictionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO predictions (
                property_id, predicted_rent, fairness_score, is_overpriced, created_at
            )
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.property_id)
        .bind(record.predicted_rent)
        .bind(record.fairness_score)
        .bind(record.is_overpriced)
        .bind(record.created_at)
        .execute(&self.db)
        .await
        .with_context(|| format!("Failed to record prediction for property {}", record.property_id))?;

        Ok(())
    }
}

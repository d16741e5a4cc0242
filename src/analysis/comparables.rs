//! Comparable selection - find listings similar to the subject property

use crate::analysis::types::{Listing, PredictionRecord};
use crate::analysis::utils::contains_ignore_case;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Mutex, RwLock};
use tracing::debug;

/// Comparables may be up to 15% smaller or larger than the subject
pub const SIZE_BAND_LOWER: f64 = 0.85;
pub const SIZE_BAND_UPPER: f64 = 1.15;

/// Matching rules for one subject property
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableQuery {
    pub city: String,
    pub locality: String,
    pub bedrooms: i32,
    pub min_area_sqft: f64,
    pub max_area_sqft: f64,
}

impl ComparableQuery {
    /// Query for listings around a subject of `area_sqft` square feet
    pub fn around(city: &str, locality: &str, bedrooms: i32, area_sqft: f64) -> Self {
        ComparableQuery {
            city: city.to_string(),
            locality: locality.to_string(),
            bedrooms,
            min_area_sqft: area_sqft * SIZE_BAND_LOWER,
            max_area_sqft: area_sqft * SIZE_BAND_UPPER,
        }
    }

    /// City and locality match case-insensitively as substrings; bedrooms exactly;
    /// area within the band, both ends inclusive
    pub fn matches(&self, listing: &Listing) -> bool {
        contains_ignore_case(&listing.city, &self.city)
            && contains_ignore_case(&listing.locality, &self.locality)
            && listing.bedrooms == self.bedrooms
            && listing.area_sqft >= self.min_area_sqft
            && listing.area_sqft <= self.max_area_sqft
    }
}

/// Listings matched for one request. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparableSet {
    listings: Vec<Listing>,
}

impl ComparableSet {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    pub fn rents(&self) -> Vec<f64> {
        self.listings.iter().map(|l| l.rent).collect()
    }
}

/// Read access to the property corpus plus the prediction log
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// `Ok(None)` when no listing has this id
    async fn find_listing(&self, id: i32) -> Result<Option<Listing>>;

    async fn find_comparables(&self, query: &ComparableQuery) -> Result<Vec<Listing>>;

    async fn record_prediction(&self, record: &PredictionRecord) -> Result<()>;
}

/// Select comparables for a subject. An empty set is a valid outcome.
pub async fn select_comparables(
    store: &dyn ListingStore,
    city: &str,
    locality: &str,
    bedrooms: i32,
    area_sqft: f64,
) -> Result<ComparableSet> {
    let query = ComparableQuery::around(city, locality, bedrooms, area_sqft);
    let listings = store.find_comparables(&query).await?;

    debug!(
        "Found {} comparables for {}/{} ({}br, {:.0}-{:.0} sqft)",
        listings.len(),
        city,
        locality,
        bedrooms,
        query.min_area_sqft,
        query.max_area_sqft
    );

    Ok(ComparableSet::new(listings))
}

/// Corpus held in process memory, matching with the same rules as the database
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    listings: RwLock<Vec<Listing>>,
    predictions: Mutex<Vec<PredictionRecord>>,
}

impl InMemoryListingStore {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
            predictions: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, listing: Listing) {
        self.listings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listing);
    }

    /// Predictions recorded so far, oldest first
    pub fn predictions(&self) -> Vec<PredictionRecord> {
        self.predictions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn find_listing(&self, id: i32) -> Result<Option<Listing>> {
        let listings = self
            .listings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn find_comparables(&self, query: &ComparableQuery) -> Result<Vec<Listing>> {
        let listings = self
            .listings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(listings.iter().filter(|l| query.matches(l)).cloned().collect())
    }

    async fn record_prediction(&self, record: &PredictionRecord) -> Result<()> {
        self.predictions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn listing(id: i32, city: &str, locality: &str, bedrooms: i32, area_sqft: f64, rent: f64) -> Listing {
        Listing {
            id,
            city: city.to_string(),
            locality: locality.to_string(),
            bedrooms,
            area_sqft,
            rent,
            created_at: None,
        }
    }

    fn corpus() -> InMemoryListingStore {
        InMemoryListingStore::new(vec![
            listing(1, "Hyderabad", "Hitech City", 2, 1000.0, 25000.0),
            listing(2, "Hyderabad", "Hitech City", 2, 850.0, 22000.0),  // lower band edge
            listing(3, "Hyderabad", "Hitech City", 2, 1150.0, 28000.0), // upper band edge
            listing(4, "Hyderabad", "Hitech City", 2, 849.0, 21000.0),  // too small
            listing(5, "Hyderabad", "Hitech City", 3, 1000.0, 30000.0), // wrong bedrooms
            listing(6, "Hyderabad", "Kondapur", 2, 1000.0, 19000.0),    // wrong locality
            listing(7, "HYDERABAD", "hitech city phase 2", 2, 1000.0, 26000.0),
        ])
    }

    #[test]
    fn test_query_band() {
        let query = ComparableQuery::around("Pune", "Baner", 1, 600.0);
        assert!((query.min_area_sqft - 510.0).abs() < 1e-9);
        assert!((query.max_area_sqft - 690.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_select_matches_fuzzy_location_and_band() {
        let store = corpus();
        let set = select_comparables(&store, "hyderabad", "Hitech", 2, 1000.0)
            .await
            .unwrap();

        let mut ids: Vec<i32> = set.listings().iter().map(|l| l.id).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 7]);

        let mut rents = set.rents();
        rents.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(rents, vec![22000.0, 25000.0, 26000.0, 28000.0]);
    }

    #[tokio::test]
    async fn test_select_nothing_is_empty_not_error() {
        let store = corpus();
        let set = select_comparables(&store, "Chennai", "Adyar", 2, 1000.0)
            .await
            .unwrap();

        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn test_find_listing() {
        let store = corpus();
        assert_eq!(store.find_listing(6).await.unwrap().unwrap().locality, "Kondapur");
        assert!(store.find_listing(99).await.unwrap().is_none());

        store.insert(listing(99, "Pune", "Baner", 1, 600.0, 14000.0));
        assert_eq!(store.find_listing(99).await.unwrap().unwrap().rent, 14000.0);
    }

    #[tokio::test]
    async fn test_record_prediction() {
        let store = InMemoryListingStore::default();
        let record = PredictionRecord {
            property_id: 1,
            predicted_rent: 15200.0,
            fairness_score: 5.26,
            is_overpriced: false,
            created_at: chrono::Utc::now(),
        };

        store.record_prediction(&record).await.unwrap();
        assert_eq!(store.predictions(), vec![record]);
    }
}

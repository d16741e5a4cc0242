//! Core data types for the fairness analysis engine
//! Pure data structures; the only behavior is deriving labels from numbers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing record as supplied by the persistence layer.
/// Immutable for the duration of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i32,
    pub city: String,
    pub locality: String,
    pub bedrooms: i32,
    pub area_sqft: f64,
    pub rent: f64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Database row from properties table
#[derive(Debug, sqlx::FromRow)]
pub struct ListingRow {
    pub id: i32,
    pub city: String,
    pub locality: String,
    pub bedrooms: i32,
    pub area_sqft: f64,
    pub rent: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            city: row.city,
            locality: row.locality,
            bedrooms: row.bedrooms,
            area_sqft: row.area_sqft,
            rent: f64::from(row.rent),
            created_at: row.created_at,
        }
    }
}

/// Subject property for a benchmark + ML analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub city: String,
    pub locality: String,
    pub bedrooms: i32,
    pub area_sqft: f64,
    pub asked_rent: f64,
}

/// Reliability of a benchmark, derived solely from the comparable count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Strict thresholds: exactly 80 is Medium, exactly 30 is Low
    pub fn from_count(count: usize) -> Self {
        if count > 80 {
            Confidence::High
        } else if count > 30 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

/// Where the asked rent sits within the comparable set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketPosition {
    #[serde(rename = "Below Market")]
    BelowMarket,
    #[serde(rename = "Market Range")]
    MarketRange,
    Premium,
}

impl MarketPosition {
    /// Bands at 25 and 75; a percentile equal to a bound falls in the upper band
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile < 25.0 {
            MarketPosition::BelowMarket
        } else if percentile < 75.0 {
            MarketPosition::MarketRange
        } else {
            MarketPosition::Premium
        }
    }
}

impl std::fmt::Display for MarketPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketPosition::BelowMarket => write!(f, "Below Market"),
            MarketPosition::MarketRange => write!(f, "Market Range"),
            MarketPosition::Premium => write!(f, "Premium"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Descriptive market-position statistics over a comparable set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub comparable_count: usize,
    pub fair_rent: f64,
    pub overpricing_percent: f64,
    pub price_range: PriceRange,
    pub confidence: Confidence,
    pub market_position_label: MarketPosition,
    pub market_position_percentile: f64,
}

/// `predicted_rent` is None when the model was unavailable or inference failed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MlPrediction {
    pub predicted_rent: Option<f64>,
}

/// Combined benchmark + ML result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentAnalysis {
    pub benchmark: Option<BenchmarkResult>,
    pub ml_prediction: MlPrediction,
}

/// Classification of an asking rent against a single ML prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketStatus {
    Overpriced,
    Underpriced,
    #[serde(rename = "Fairly Priced")]
    FairlyPriced,
    #[serde(rename = "Prediction failed")]
    PredictionFailed,
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketStatus::Overpriced => write!(f, "Overpriced"),
            MarketStatus::Underpriced => write!(f, "Underpriced"),
            MarketStatus::FairlyPriced => write!(f, "Fairly Priced"),
            MarketStatus::PredictionFailed => write!(f, "Prediction failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRange {
    pub low: i64,
    pub high: i64,
}

/// Single-prediction fairness verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessVerdict {
    pub predicted_rent: i64,
    pub difference: i64,
    #[serde(rename = "market_status")]
    pub status: MarketStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub market_range: Option<MarketRange>,
}

impl FairnessVerdict {
    /// Degraded verdict returned when no prediction could be made
    pub fn prediction_failed() -> Self {
        FairnessVerdict {
            predicted_rent: 0,
            difference: 0,
            status: MarketStatus::PredictionFailed,
            message: "Unable to estimate market value".to_string(),
            market_range: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.status == MarketStatus::PredictionFailed
    }
}

/// Response envelope for a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub market_analysis: FairnessVerdict,
}

/// Row for the predictions table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub property_id: i32,
    pub predicted_rent: f64,
    pub fairness_score: f64, // percent above (+) or below (-) the prediction
    pub is_overpriced: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_boundaries() {
        assert_eq!(Confidence::from_count(81), Confidence::High);
        assert_eq!(Confidence::from_count(80), Confidence::Medium);
        assert_eq!(Confidence::from_count(31), Confidence::Medium);
        assert_eq!(Confidence::from_count(30), Confidence::Low);
        assert_eq!(Confidence::from_count(1), Confidence::Low);
    }

    #[test]
    fn test_market_position_boundaries() {
        assert_eq!(MarketPosition::from_percentile(24.99), MarketPosition::BelowMarket);
        assert_eq!(MarketPosition::from_percentile(25.0), MarketPosition::MarketRange);
        assert_eq!(MarketPosition::from_percentile(74.99), MarketPosition::MarketRange);
        assert_eq!(MarketPosition::from_percentile(75.0), MarketPosition::Premium);
        assert_eq!(MarketPosition::from_percentile(100.0), MarketPosition::Premium);
    }

    #[test]
    fn test_verdict_serialization() {
        let analysis = MarketAnalysis {
            market_analysis: FairnessVerdict {
                predicted_rent: 15200,
                difference: 800,
                status: MarketStatus::FairlyPriced,
                message: "₹800 close to market average".to_string(),
                market_range: Some(MarketRange {
                    low: 13680,
                    high: 16720,
                }),
            },
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["market_analysis"]["market_status"], "Fairly Priced");
        assert_eq!(json["market_analysis"]["market_range"]["low"], 13680);
        assert_eq!(json["market_analysis"]["predicted_rent"], 15200);
    }

    #[test]
    fn test_degraded_verdict_omits_range() {
        let json = serde_json::to_value(FairnessVerdict::prediction_failed()).unwrap();
        assert_eq!(json["market_status"], "Prediction failed");
        assert_eq!(json["predicted_rent"], 0);
        assert!(json.get("market_range").is_none());
    }

    #[test]
    fn test_empty_analysis_serialization() {
        let analysis = RentAnalysis {
            benchmark: None,
            ml_prediction: MlPrediction::default(),
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["benchmark"].is_null());
        assert!(json["ml_prediction"]["predicted_rent"].is_null());
    }
}

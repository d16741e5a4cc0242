//! Fairness analyzer - orchestrates comparable selection, benchmark and ML prediction

use crate::analysis::benchmark::compute_benchmark;
use crate::analysis::comparables::{select_comparables, ListingStore};
use crate::analysis::error::EngineError;
use crate::analysis::features::FeatureRow;
use crate::analysis::predictor::RentPredictor;
use crate::analysis::types::{
    AnalysisRequest, BenchmarkResult, FairnessVerdict, MarketRange, MarketStatus, MlPrediction,
    PredictionRecord, RentAnalysis,
};
use crate::analysis::utils::{round2, round_half_even, round_to_hundred};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Absolute gap (currency units) beyond which an asking rent is over/under priced
pub const PRICE_TOLERANCE: i64 = 2000;

/// Suggested range is ±10% around the prediction
pub const MARKET_RANGE_LOWER: f64 = 0.9;
pub const MARKET_RANGE_UPPER: f64 = 1.1;

pub const CURRENCY_SYMBOL: &str = "₹";

pub struct FairnessAnalyzer {
    store: Arc<dyn ListingStore>,
    predictor: RentPredictor,
    record_predictions: bool,
}

impl FairnessAnalyzer {
    pub fn new(store: Arc<dyn ListingStore>, predictor: RentPredictor) -> Self {
        Self {
            store,
            predictor,
            record_predictions: true,
        }
    }

    pub fn with_prediction_log(mut self, enabled: bool) -> Self {
        self.record_predictions = enabled;
        self
    }

    /// Benchmark against comparables and predict with the model, concurrently.
    ///
    /// No comparables gives `benchmark: None`; an unavailable model gives
    /// `predicted_rent: None`. Neither outcome blocks the other.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<RentAnalysis, EngineError> {
        if !request.asked_rent.is_finite() || request.asked_rent < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "asked_rent must be a non-negative number, got {}",
                request.asked_rent
            )));
        }
        let row = FeatureRow::builder(
            &request.city,
            &request.locality,
            request.bedrooms,
            request.area_sqft,
        )
        .build()?;

        let (benchmark, predicted_rent) = tokio::join!(
            self.benchmark_or_none(request),
            self.predict_or_none(row)
        );

        Ok(RentAnalysis {
            benchmark: benchmark?,
            ml_prediction: MlPrediction { predicted_rent },
        })
    }

    /// Classify a stored listing's rent against a single model prediction.
    ///
    /// An unknown id is `EngineError::NotFound`; an unavailable model yields the
    /// degraded "Prediction failed" verdict rather than an error.
    pub async fn classify(&self, property_id: i32) -> Result<FairnessVerdict, EngineError> {
        let listing = self
            .store
            .find_listing(property_id)
            .await?
            .ok_or(EngineError::NotFound(property_id))?;

        let row = match FeatureRow::from_listing(&listing) {
            Ok(row) => row,
            Err(e) => {
                warn!("Property {} has unusable stored fields: {}", property_id, e);
                return Ok(FairnessVerdict::prediction_failed());
            }
        };
        let verdict = match self.predictor.predict(row).await {
            Ok(raw) => classify_prediction(raw, listing.rent),
            Err(reason) => {
                warn!("Prediction failed for property {}: {}", property_id, reason);
                return Ok(FairnessVerdict::prediction_failed());
            }
        };

        debug!(
            "Property {}: {} (predicted {}, difference {})",
            property_id, verdict.status, verdict.predicted_rent, verdict.difference
        );

        if self.record_predictions {
            let record = prediction_record(property_id, &verdict);
            if let Err(e) = self.store.record_prediction(&record).await {
                warn!("Failed to record prediction for property {}: {:#}", property_id, e);
            }
        }

        Ok(verdict)
    }

    async fn benchmark_or_none(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Option<BenchmarkResult>, EngineError> {
        let comparables = select_comparables(
            self.store.as_ref(),
            &request.city,
            &request.locality,
            request.bedrooms,
            request.area_sqft,
        )
        .await?;

        if comparables.is_empty() {
            info!(
                "No comparables for {}/{} ({}br), skipping benchmark",
                request.city, request.locality, request.bedrooms
            );
            return Ok(None);
        }

        let rents: Vec<f64> = comparables
            .rents()
            .into_iter()
            .filter(|rent| rent.is_finite() && *rent > 0.0)
            .collect();
        let dropped = comparables.len() - rents.len();
        if dropped > 0 {
            warn!(
                "Ignoring {} comparables with non-positive rent in {}/{}",
                dropped, request.city, request.locality
            );
        }
        if rents.is_empty() {
            return Ok(None);
        }

        debug!("Benchmarking against {} comparables", rents.len());
        compute_benchmark(&rents, request.asked_rent).map(Some)
    }

    async fn predict_or_none(&self, row: FeatureRow) -> Option<f64> {
        match self.predictor.predict(row).await {
            Ok(rent) => Some(rent),
            Err(reason) => {
                warn!("ML prediction unavailable: {}", reason);
                None
            }
        }
    }
}

/// Turn a raw model estimate into a verdict on `asked_rent`
pub fn classify_prediction(raw_prediction: f64, asked_rent: f64) -> FairnessVerdict {
    let predicted_rent = round_to_hundred(raw_prediction);
    let difference = round_half_even(asked_rent) - predicted_rent;
    let gap = difference.abs();

    let (status, message) = if difference > PRICE_TOLERANCE {
        (
            MarketStatus::Overpriced,
            format!("{}{} higher than market average", CURRENCY_SYMBOL, gap),
        )
    } else if difference < -PRICE_TOLERANCE {
        (
            MarketStatus::Underpriced,
            format!("{}{} lower than market average", CURRENCY_SYMBOL, gap),
        )
    } else {
        (
            MarketStatus::FairlyPriced,
            format!("{}{} close to market average", CURRENCY_SYMBOL, gap),
        )
    };

    let predicted = predicted_rent as f64;
    FairnessVerdict {
        predicted_rent,
        difference,
        status,
        message,
        market_range: Some(MarketRange {
            low: round_half_even(predicted * MARKET_RANGE_LOWER),
            high: round_half_even(predicted * MARKET_RANGE_UPPER),
        }),
    }
}

fn prediction_record(property_id: i32, verdict: &FairnessVerdict) -> PredictionRecord {
    let fairness_score = if verdict.predicted_rent == 0 {
        0.0
    } else {
        round2(verdict.difference as f64 / verdict.predicted_rent as f64 * 100.0)
    };

    PredictionRecord {
        property_id,
        predicted_rent: verdict.predicted_rent as f64,
        fairness_score,
        is_overpriced: verdict.status == MarketStatus::Overpriced,
        created_at: Utc::now(),
    }
}

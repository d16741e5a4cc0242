//! Benchmark calculation - market-position statistics over comparable rents
//! Pure function - no side effects

use crate::analysis::error::EngineError;
use crate::analysis::types::{BenchmarkResult, Confidence, MarketPosition, PriceRange};
use crate::analysis::utils::round2;

/// Compute fair rent, percentile rank, price range and labels for `asked_rent`.
///
/// `rents` must be non-empty; order does not matter. Statistics are computed at
/// full precision and rounded to 2 places only in the returned result.
pub fn compute_benchmark(rents: &[f64], asked_rent: f64) -> Result<BenchmarkResult, EngineError> {
    if rents.is_empty() {
        return Err(EngineError::EmptyComparables);
    }
    if let Some(bad) = rents.iter().find(|r| !r.is_finite() || **r <= 0.0) {
        return Err(EngineError::InvalidInput(format!(
            "comparable rent must be positive, got {}",
            bad
        )));
    }
    if !asked_rent.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "asked rent must be finite, got {}",
            asked_rent
        )));
    }

    let count = rents.len();
    let fair_rent = rents.iter().sum::<f64>() / count as f64;
    let min = rents.iter().copied().fold(f64::INFINITY, f64::min);
    let max = rents.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let overpricing_percent = (asked_rent - fair_rent) / fair_rent * 100.0;

    // Ties count toward the asked rent: a comparable priced exactly at it is "at or below"
    let at_or_below = rents.iter().filter(|&&rent| rent <= asked_rent).count();
    let percentile = at_or_below as f64 / count as f64 * 100.0;

    Ok(BenchmarkResult {
        comparable_count: count,
        // Rounding can step past the extremes when rents carry fractional cents
        fair_rent: round2(fair_rent).clamp(min, max),
        overpricing_percent: round2(overpricing_percent),
        price_range: PriceRange { min, max },
        confidence: Confidence::from_count(count),
        market_position_label: MarketPosition::from_percentile(percentile),
        market_position_percentile: round2(percentile),
    })
}

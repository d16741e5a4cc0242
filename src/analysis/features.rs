//! Feature rows for the rent regression model
//!
//! A [`FeatureRow`] has a fixed schema: the subject's location, size and bedroom
//! count, plus furnishing level and listing age which fall back to defaults
//! when the caller does not know them. Rows are validated when built, so the
//! predictor never sees a malformed row.

use crate::analysis::error::EngineError;
use crate::analysis::types::Listing;
use crate::analysis::utils::normalize_feature_text;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Categorical columns a model artifact may reference
pub const CATEGORICAL_COLUMNS: [&str; 3] = ["city", "locality", "furnishing"];

/// Numeric columns a model artifact may reference
pub const NUMERIC_COLUMNS: [&str; 3] = ["bedrooms", "area_sqft", "days_old"];

/// Listing age assumed when the caller does not supply one
pub const DEFAULT_DAYS_OLD: u32 = 30;

/// Furnishing levels seen by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Furnishing {
    Unfurnished,
    #[default]
    Semi,
    Full,
}

impl Furnishing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Furnishing::Unfurnished => "unfurnished",
            Furnishing::Semi => "semi",
            Furnishing::Full => "full",
        }
    }
}

impl std::fmt::Display for Furnishing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Furnishing {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_feature_text(s).as_str() {
            "unfurnished" => Ok(Furnishing::Unfurnished),
            "semi" | "semi-furnished" => Ok(Furnishing::Semi),
            "full" | "furnished" => Ok(Furnishing::Full),
            other => Err(EngineError::InvalidInput(format!(
                "unknown furnishing level: {}",
                other
            ))),
        }
    }
}

/// One validated model input row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    city: String,
    locality: String,
    bedrooms: i32,
    area_sqft: f64,
    furnishing: Furnishing,
    days_old: u32,
}

impl FeatureRow {
    pub fn builder(city: &str, locality: &str, bedrooms: i32, area_sqft: f64) -> FeatureRowBuilder {
        FeatureRowBuilder {
            city: city.to_string(),
            locality: locality.to_string(),
            bedrooms,
            area_sqft,
            furnishing: Furnishing::default(),
            days_old: DEFAULT_DAYS_OLD,
        }
    }

    pub fn from_listing(listing: &Listing) -> Result<Self, EngineError> {
        Self::builder(
            &listing.city,
            &listing.locality,
            listing.bedrooms,
            listing.area_sqft,
        )
        .build()
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn locality(&self) -> &str {
        &self.locality
    }

    pub fn bedrooms(&self) -> i32 {
        self.bedrooms
    }

    pub fn area_sqft(&self) -> f64 {
        self.area_sqft
    }

    pub fn furnishing(&self) -> Furnishing {
        self.furnishing
    }

    pub fn days_old(&self) -> u32 {
        self.days_old
    }

    /// Value of a categorical column by name
    pub fn categorical(&self, column: &str) -> Option<&str> {
        match column {
            "city" => Some(self.city.as_str()),
            "locality" => Some(self.locality.as_str()),
            "furnishing" => Some(self.furnishing.as_str()),
            _ => None,
        }
    }

    /// Value of a numeric column by name
    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "bedrooms" => Some(f64::from(self.bedrooms)),
            "area_sqft" => Some(self.area_sqft),
            "days_old" => Some(f64::from(self.days_old)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureRowBuilder {
    city: String,
    locality: String,
    bedrooms: i32,
    area_sqft: f64,
    furnishing: Furnishing,
    days_old: u32,
}

impl FeatureRowBuilder {
    pub fn furnishing(mut self, furnishing: Furnishing) -> Self {
        self.furnishing = furnishing;
        self
    }

    pub fn days_old(mut self, days_old: u32) -> Self {
        self.days_old = days_old;
        self
    }

    pub fn build(self) -> Result<FeatureRow, EngineError> {
        let city = normalize_feature_text(&self.city);
        let locality = normalize_feature_text(&self.locality);

        if city.is_empty() {
            return Err(EngineError::InvalidInput("city is required".to_string()));
        }
        if locality.is_empty() {
            return Err(EngineError::InvalidInput("locality is required".to_string()));
        }
        if self.bedrooms < 1 {
            return Err(EngineError::InvalidInput(format!(
                "bedrooms must be at least 1, got {}",
                self.bedrooms
            )));
        }
        if !self.area_sqft.is_finite() || self.area_sqft <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "area_sqft must be positive, got {}",
                self.area_sqft
            )));
        }

        Ok(FeatureRow {
            city,
            locality,
            bedrooms: self.bedrooms,
            area_sqft: self.area_sqft,
            furnishing: self.furnishing,
            days_old: self.days_old,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_applies_defaults() {
        let row = FeatureRow::builder("Hyderabad", "Gachibowli", 2, 1100.0)
            .build()
            .unwrap();

        assert_eq!(row.furnishing(), Furnishing::Semi);
        assert_eq!(row.days_old(), DEFAULT_DAYS_OLD);
        assert_eq!(row.categorical("furnishing"), Some("semi"));
        assert_eq!(row.numeric("days_old"), Some(30.0));
    }

    #[test]
    fn test_builder_normalizes_text() {
        let row = FeatureRow::builder(" Mumbai ", "Navi Mumbai", 3, 1500.0)
            .furnishing(Furnishing::Full)
            .days_old(0)
            .build()
            .unwrap();

        assert_eq!(row.city(), "mumbai");
        assert_eq!(row.categorical("locality"), Some("navi mumbai"));
        assert_eq!(row.numeric("bedrooms"), Some(3.0));
        assert_eq!(row.numeric("area_sqft"), Some(1500.0));
        assert_eq!(row.numeric("days_old"), Some(0.0));
    }

    #[test]
    fn test_builder_rejects_invalid_rows() {
        assert!(FeatureRow::builder("", "Powai", 2, 900.0).build().is_err());
        assert!(FeatureRow::builder("Mumbai", "  ", 2, 900.0).build().is_err());
        assert!(FeatureRow::builder("Mumbai", "Powai", 0, 900.0).build().is_err());
        assert!(FeatureRow::builder("Mumbai", "Powai", 2, 0.0).build().is_err());
        assert!(FeatureRow::builder("Mumbai", "Powai", 2, f64::NAN).build().is_err());
    }

    #[test]
    fn test_unknown_columns() {
        let row = FeatureRow::builder("Pune", "Baner", 1, 600.0).build().unwrap();
        assert_eq!(row.categorical("bhk"), None);
        assert_eq!(row.numeric("sqft"), None);
    }

    #[test]
    fn test_parse_furnishing() {
        assert_eq!("Semi".parse::<Furnishing>().unwrap(), Furnishing::Semi);
        assert_eq!("furnished".parse::<Furnishing>().unwrap(), Furnishing::Full);
        assert_eq!(" unfurnished".parse::<Furnishing>().unwrap(), Furnishing::Unfurnished);
        assert!("luxury".parse::<Furnishing>().is_err());
    }
}

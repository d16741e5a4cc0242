//! Pre-trained rent regression artifact
//!
//! The artifact is a JSON document describing a fitted pipeline:
//! - one-hot encoding for each categorical column (unknown categories encode as
//!   all zeros)
//! - pass-through numeric columns, appended after the one-hot block
//! - a regressor: either a random forest in flat node-array layout or a linear
//!   model over the encoded vector
//!
//! The engine only consumes artifacts; they are produced by the offline
//! training job.

use crate::analysis::error::ModelUnavailable;
use crate::analysis::features::{FeatureRow, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Artifact format version this engine understands
pub const ARTIFACT_VERSION: u32 = 1;

/// Node marker for "no child" in the flat tree layout
const LEAF: i64 = -1;

/// Anything that can turn feature rows into rent estimates
pub trait RentModel: Send + Sync {
    /// One estimate per input row, in order
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelUnavailable>;

    /// Model name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub column: String,
    pub categories: Vec<String>,
}

/// Decision tree in flat array layout; node 0 is the root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    RandomForest { trees: Vec<DecisionTree> },
    Linear { intercept: f64, coefficients: Vec<f64> },
}

/// Fitted preprocessing + regression pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentPipeline {
    pub version: u32,
    pub categorical: Vec<CategoricalColumn>,
    pub numeric: Vec<String>,
    pub regressor: Regressor,
}

impl RentPipeline {
    /// Read, decode and validate an artifact file
    pub fn load(path: &Path) -> Result<Self, ModelUnavailable> {
        if !path.exists() {
            return Err(ModelUnavailable::Missing(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| ModelUnavailable::Unreadable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Decode and validate an artifact from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelUnavailable> {
        let pipeline: RentPipeline = serde_json::from_str(json)
            .map_err(|e| ModelUnavailable::Corrupt(format!("failed to parse artifact: {}", e)))?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Length of the encoded feature vector
    pub fn width(&self) -> usize {
        let one_hot: usize = self.categorical.iter().map(|c| c.categories.len()).sum();
        one_hot + self.numeric.len()
    }

    pub fn validate(&self) -> Result<(), ModelUnavailable> {
        if self.version != ARTIFACT_VERSION {
            return Err(corrupt(format!(
                "unsupported artifact version {} (expected {})",
                self.version, ARTIFACT_VERSION
            )));
        }

        for column in &self.categorical {
            if !CATEGORICAL_COLUMNS.contains(&column.column.as_str()) {
                return Err(corrupt(format!("unknown categorical column: {}", column.column)));
            }
        }
        for column in &self.numeric {
            if !NUMERIC_COLUMNS.contains(&column.as_str()) {
                return Err(corrupt(format!("unknown numeric column: {}", column)));
            }
        }

        let width = self.width();
        if width == 0 {
            return Err(corrupt("artifact declares no feature columns".to_string()));
        }

        match &self.regressor {
            Regressor::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(corrupt("random forest has no trees".to_string()));
                }
                for (idx, tree) in trees.iter().enumerate() {
                    tree.validate(width)
                        .map_err(|e| corrupt(format!("tree {}: {}", idx, e)))?;
                }
            }
            Regressor::Linear { intercept, coefficients } => {
                if coefficients.len() != width {
                    return Err(corrupt(format!(
                        "linear model has {} coefficients for {} features",
                        coefficients.len(),
                        width
                    )));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(corrupt("linear model has non-finite weights".to_string()));
                }
            }
        }

        Ok(())
    }

    /// Encode one row: one-hot block first, numeric pass-through after
    pub fn encode(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelUnavailable> {
        let mut encoded = Vec::with_capacity(self.width());

        for column in &self.categorical {
            let value = row.categorical(&column.column).ok_or_else(|| {
                ModelUnavailable::Inference(format!("row has no column {}", column.column))
            })?;
            encoded.extend(
                column
                    .categories
                    .iter()
                    .map(|category| if category == value { 1.0 } else { 0.0 }),
            );
        }

        for column in &self.numeric {
            let value = row.numeric(column).ok_or_else(|| {
                ModelUnavailable::Inference(format!("row has no column {}", column))
            })?;
            encoded.push(value);
        }

        Ok(encoded)
    }

    fn predict_encoded(&self, x: &[f64]) -> f64 {
        match &self.regressor {
            Regressor::RandomForest { trees } => {
                let total: f64 = trees.iter().map(|tree| tree.predict(x)).sum();
                total / trees.len() as f64
            }
            Regressor::Linear { intercept, coefficients } => {
                intercept + coefficients.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
            }
        }
    }
}

impl RentModel for RentPipeline {
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, ModelUnavailable> {
        rows.iter()
            .map(|row| self.encode(row).map(|x| self.predict_encoded(&x)))
            .collect()
    }

    fn name(&self) -> &str {
        match self.regressor {
            Regressor::RandomForest { .. } => "random_forest",
            Regressor::Linear { .. } => "linear",
        }
    }
}

impl DecisionTree {
    fn validate(&self, width: usize) -> Result<(), String> {
        let nodes = self.children_left.len();
        if nodes == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != nodes)
        {
            return Err("node arrays have different lengths".to_string());
        }

        for node in 0..nodes {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if !self.value[node].is_finite() {
                    return Err(format!("leaf {} has a non-finite value", node));
                }
                continue;
            }
            // Children always follow their parent, so traversal terminates
            for child in [left, right] {
                if child <= node as i64 || child >= nodes as i64 {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= width as i64 {
                return Err(format!("node {} splits on invalid feature {}", node, feature));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {} has a NaN threshold", node));
            }
        }

        Ok(())
    }

    fn predict(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}

fn corrupt(message: String) -> ModelUnavailable {
    ModelUnavailable::Corrupt(message)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Two-city forest: Mumbai rents higher, and bigger homes rent higher
    pub(crate) fn sample_forest_json() -> String {
        serde_json::json!({
            "version": 1,
            "categorical": [
                { "column": "city", "categories": ["hyderabad", "mumbai"] },
                { "column": "furnishing", "categories": ["full", "semi", "unfurnished"] }
            ],
            "numeric": ["bedrooms", "area_sqft"],
            "regressor": {
                "kind": "random_forest",
                "trees": [
                    {
                        // x[1] is the "mumbai" one-hot slot
                        "children_left": [1, -1, -1],
                        "children_right": [2, -1, -1],
                        "feature": [1, -2, -2],
                        "threshold": [0.5, -2.0, -2.0],
                        "value": [0.0, 20000.0, 40000.0]
                    },
                    {
                        // x[6] is area_sqft
                        "children_left": [1, -1, -1],
                        "children_right": [2, -1, -1],
                        "feature": [6, -2, -2],
                        "threshold": [1000.0, -2.0, -2.0],
                        "value": [0.0, 10000.0, 30000.0]
                    }
                ]
            }
        })
        .to_string()
    }

    pub(crate) fn write_artifact(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn row(city: &str, area_sqft: f64) -> FeatureRow {
        FeatureRow::builder(city, "Any", 2, area_sqft).build().unwrap()
    }

    #[test]
    fn test_forest_prediction() {
        let pipeline = RentPipeline::from_json(&sample_forest_json()).unwrap();
        assert_eq!(pipeline.width(), 7);

        let predictions = pipeline
            .predict(&[row("Mumbai", 1200.0), row("Hyderabad", 800.0)])
            .unwrap();

        assert_eq!(predictions, vec![35000.0, 15000.0]);
    }

    #[test]
    fn test_unknown_category_encodes_as_zeros() {
        let pipeline = RentPipeline::from_json(&sample_forest_json()).unwrap();
        let encoded = pipeline.encode(&row("Guntur", 900.0)).unwrap();

        assert_eq!(encoded, vec![0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 900.0]);
    }

    #[test]
    fn test_linear_prediction() {
        let json = serde_json::json!({
            "version": 1,
            "categorical": [{ "column": "locality", "categories": ["bandra", "powai"] }],
            "numeric": ["bedrooms", "area_sqft", "days_old"],
            "regressor": {
                "kind": "linear",
                "intercept": 1000.0,
                "coefficients": [5000.0, 2000.0, 2000.0, 20.0, -10.0]
            }
        })
        .to_string();
        let pipeline = RentPipeline::from_json(&json).unwrap();

        let row = FeatureRow::builder("Mumbai", "Bandra", 2, 1000.0)
            .build()
            .unwrap();
        // 1000 + 5000 + 2*2000 + 1000*20 - 30*10
        assert_eq!(pipeline.predict(&[row]).unwrap(), vec![29700.0]);
        assert_eq!(pipeline.name(), "linear");
    }

    #[test]
    fn test_load_missing_file() {
        let result = RentPipeline::load(Path::new("/nonexistent/ml/rent_model.json"));
        assert!(matches!(result, Err(ModelUnavailable::Missing(_))));
    }

    #[test]
    fn test_load_from_file() {
        let file = write_artifact(&sample_forest_json());
        let pipeline = RentPipeline::load(file.path()).unwrap();
        assert_eq!(pipeline.name(), "random_forest");
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let file = write_artifact("\u{80}\u{3}pickle-bytes");
        let result = RentPipeline::load(file.path());
        assert!(matches!(result, Err(ModelUnavailable::Corrupt(_))));
    }

    #[test]
    fn test_rejects_unknown_column() {
        let json = sample_forest_json().replace("\"area_sqft\"]", "\"sqft\"]");
        let result = RentPipeline::from_json(&json);
        assert!(matches!(result, Err(ModelUnavailable::Corrupt(_))));
    }

    #[test]
    fn test_rejects_cyclic_tree() {
        let json = sample_forest_json().replacen(
            "\"children_left\":[1,-1,-1]",
            "\"children_left\":[0,-1,-1]",
            1,
        );
        let result = RentPipeline::from_json(&json);
        assert!(matches!(result, Err(ModelUnavailable::Corrupt(_))));
    }

    #[test]
    fn test_rejects_wrong_coefficient_count() {
        let json = serde_json::json!({
            "version": 1,
            "categorical": [],
            "numeric": ["area_sqft"],
            "regressor": { "kind": "linear", "intercept": 0.0, "coefficients": [1.0, 2.0] }
        })
        .to_string();
        assert!(matches!(
            RentPipeline::from_json(&json),
            Err(ModelUnavailable::Corrupt(_))
        ));
    }

    #[test]
    fn test_rejects_future_version() {
        let json = sample_forest_json().replacen("\"version\":1", "\"version\":2", 1);
        assert!(matches!(
            RentPipeline::from_json(&json),
            Err(ModelUnavailable::Corrupt(_))
        ));
    }
}

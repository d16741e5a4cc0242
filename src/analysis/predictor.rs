//! Rent predictor - lazily loaded, process-wide regression model handle
//!
//! The artifact is loaded on first use and memoized, including a failed load:
//! once unavailable, the predictor stays unavailable for the life of the
//! process. Concurrent first callers block on the same initialization, so at
//! most one load ever runs.

use crate::analysis::artifact::{RentModel, RentPipeline};
use crate::analysis::error::ModelUnavailable;
use crate::analysis::features::FeatureRow;
use crate::analysis::utils::round2;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{info, warn};

/// Default bound on a single inference call
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(2);

/// Source of a model instance; called at most once per predictor
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn RentModel>, ModelUnavailable>;
}

/// Loads a [`RentPipeline`] artifact from a fixed path
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    path: PathBuf,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for ArtifactLoader {
    fn load(&self) -> Result<Arc<dyn RentModel>, ModelUnavailable> {
        let pipeline = RentPipeline::load(&self.path)?;
        Ok(Arc::new(pipeline))
    }
}

type ModelHandle = Result<Arc<dyn RentModel>, ModelUnavailable>;

struct ModelSlot {
    loader: Box<dyn ModelLoader>,
    handle: OnceLock<ModelHandle>,
}

impl ModelSlot {
    fn get_or_load(&self) -> ModelHandle {
        self.handle
            .get_or_init(|| {
                let loaded = self.loader.load();
                match &loaded {
                    Ok(model) => info!("Rent model loaded ({})", model.name()),
                    Err(reason) => warn!("Rent model unavailable for this process: {}", reason),
                }
                loaded
            })
            .clone()
    }
}

/// Shared handle to the memoized model. Cheap to clone.
#[derive(Clone)]
pub struct RentPredictor {
    slot: Arc<ModelSlot>,
    timeout: Duration,
}

impl RentPredictor {
    pub fn new(loader: impl ModelLoader + 'static, timeout: Duration) -> Self {
        Self {
            slot: Arc::new(ModelSlot {
                loader: Box::new(loader),
                handle: OnceLock::new(),
            }),
            timeout,
        }
    }

    pub fn from_artifact(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::new(ArtifactLoader::new(path), timeout)
    }

    /// Return the model, loading it on first call. Blocks while a load is in progress.
    pub fn get_or_load(&self) -> Result<Arc<dyn RentModel>, ModelUnavailable> {
        self.slot.get_or_load()
    }

    /// Predict market rent for one row, rounded to 2 places.
    ///
    /// Every failure mode (missing or corrupt artifact, inference error, panic,
    /// timeout) comes back as `Err(ModelUnavailable)`; nothing is raised.
    pub async fn predict(&self, row: FeatureRow) -> Result<f64, ModelUnavailable> {
        let slot = Arc::clone(&self.slot);
        let model = tokio::task::spawn_blocking(move || slot.get_or_load())
            .await
            .map_err(|e| ModelUnavailable::Inference(format!("model load aborted: {}", e)))??;

        // A timed-out inference keeps running on the blocking pool; its result is discarded
        let inference = tokio::task::spawn_blocking(move || model.predict(std::slice::from_ref(&row)));
        let outputs = match tokio::time::timeout(self.timeout, inference).await {
            Err(_) => return Err(ModelUnavailable::Timeout(self.timeout)),
            Ok(Err(join_error)) => {
                return Err(ModelUnavailable::Inference(format!(
                    "inference aborted: {}",
                    join_error
                )))
            }
            Ok(Ok(result)) => result?,
        };

        match outputs.as_slice() {
            [value] if value.is_finite() => Ok(round2(*value)),
            [value] => Err(ModelUnavailable::Inference(format!(
                "model returned non-finite rent {}",
                value
            ))),
            other => Err(ModelUnavailable::Inference(format!(
                "expected 1 prediction, got {}",
                other.len()
            ))),
        }
    }
}

use anyhow::{Context, Result};
use rent_fairness::analysis::{FairnessAnalyzer, PgListingStore, RentPredictor};
use rent_fairness::api::{self, AppState};
use rent_fairness::config::Config;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("🏠 Starting rent fairness API server...");

    let config = Config::from_env()?;

    info!("📦 Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("✅ Database connected successfully");

    let predictor = RentPredictor::from_artifact(config.model_path.clone(), config.inference_timeout);

    // Load the model in the background so the first request does not pay for it
    let warmup = predictor.clone();
    tokio::task::spawn_blocking(move || {
        if warmup.get_or_load().is_err() {
            warn!("Serving without ML estimates");
        }
    });

    let analyzer = FairnessAnalyzer::new(Arc::new(PgListingStore::new(pool)), predictor)
        .with_prediction_log(config.record_predictions);

    let app = api::router(AppState {
        analyzer: Arc::new(analyzer),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🚀 Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

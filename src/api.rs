//! HTTP routes exposing the analysis engine

use crate::analysis::{AnalysisRequest, EngineError, FairnessAnalyzer, MarketAnalysis, RentAnalysis};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<FairnessAnalyzer>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse {
    pub message: String,
    pub status: String,
}

/// Error body: `{"error": "..."}` with a matching status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(_) => ApiError {
                status: StatusCode::NOT_FOUND,
                message: "Property not found".to_string(),
            },
            EngineError::InvalidInput(message) => ApiError {
                status: StatusCode::BAD_REQUEST,
                message,
            },
            other => {
                error!("Analysis failed: {:#}", other);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Analysis failed".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/health", get(health_check))
        .route("/api/analysis/rent", post(analyze_rent))
        .route("/api/properties/:property_id/analysis", post(analyze_property))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Rent fairness API is running!".to_string(),
        status: "ok".to_string(),
    })
}

async fn analyze_rent(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<RentAnalysis>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: rejection.body_text(),
    })?;

    let analysis = state.analyzer.analyze(&request).await?;
    Ok(Json(analysis))
}

async fn analyze_property(
    State(state): State<AppState>,
    Path(property_id): Path<i32>,
) -> Result<Json<MarketAnalysis>, ApiError> {
    let verdict = state.analyzer.classify(property_id).await?;
    Ok(Json(MarketAnalysis {
        market_analysis: verdict,
    }))
}

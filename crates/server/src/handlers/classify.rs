//! Health and ad-hoc classification handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use finsight_core::ClassificationResult;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};

/// Batches larger than this are rejected.
const MAX_BATCH_SIZE: usize = 1000;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub rules: usize,
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        rules: state.engine.len(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub description: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// POST /api/classify
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Json<ClassificationResult> {
    Json(state.engine.classify(&req.description, req.amount))
}

/// POST /api/classify/batch - results come back in request order
pub async fn classify_batch(
    State(state): State<Arc<AppState>>,
    Json(items): Json<Vec<ClassifyRequest>>,
) -> Result<Json<Vec<ClassificationResult>>, AppError> {
    if items.len() > MAX_BATCH_SIZE {
        return Err(AppError::bad_request(&format!(
            "At most {} descriptions per batch",
            MAX_BATCH_SIZE
        )));
    }

    let pairs: Vec<(&str, Option<f64>)> = items
        .iter()
        .map(|item| (item.description.as_str(), item.amount))
        .collect();
    Ok(Json(state.engine.classify_batch(&pairs)))
}

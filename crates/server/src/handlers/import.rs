//! CSV import handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use finsight_import::{ImportPipeline, ImportReport};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Original file name; drives file-kind detection and report labels.
    pub filename: Option<String>,
}

/// POST /api/import/csv?filename= - raw CSV body
///
/// Spending files are reported but not stored.
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportQuery>,
    body: Bytes,
) -> Result<Json<ImportReport>, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("Request body is empty"));
    }

    let pipeline = ImportPipeline::new(state.engine.as_ref(), &state.ids);
    let outcome = pipeline.import(body.as_ref(), params.filename.as_deref(), state.today());

    let mut store = state.store.lock().await;
    if !outcome.transactions.is_empty() {
        let added = store
            .add_transactions(outcome.transactions)
            .await
            .map_err(AppError::store)?;
        info!(added, "Stored imported transactions");
    }
    if !outcome.accounts.is_empty() {
        let added = store
            .add_accounts(outcome.accounts)
            .await
            .map_err(AppError::store)?;
        info!(added, "Stored imported accounts");
    }

    Ok(Json(outcome.report))
}

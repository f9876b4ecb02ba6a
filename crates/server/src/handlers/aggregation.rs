//! Account aggregation (Yodlee) handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub login_name: String,
    /// Defaults to three months before `to`.
    pub from: Option<NaiveDate>,
    /// Defaults to today.
    pub to: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub accounts: usize,
    pub imported_count: usize,
}

/// POST /api/aggregation/sync
pub async fn aggregation_sync(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let client = state
        .yodlee
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("Account aggregation is not configured"))?;

    if req.login_name.trim().is_empty() {
        return Err(AppError::bad_request("login_name is required"));
    }

    let today = state.today();
    let to = req.to.unwrap_or(today);
    let from = req
        .from
        .unwrap_or_else(|| to.checked_sub_months(Months::new(3)).unwrap_or(to));
    if from > to {
        return Err(AppError::bad_request("from must not be after to"));
    }

    let synced = client
        .sync(&req.login_name, from, to, today)
        .await
        .map_err(|e| AppError::bad_gateway("Aggregation provider request failed", e))?;

    let mut store = state.store.lock().await;
    let accounts = store
        .add_accounts(synced.accounts)
        .await
        .map_err(AppError::store)?;
    let imported_count = store
        .add_synced_transactions(synced.transactions)
        .await
        .map_err(AppError::store)?;

    info!(login_name = %req.login_name, accounts, imported_count, "Aggregation sync stored");
    Ok(Json(SyncResponse {
        accounts,
        imported_count,
    }))
}

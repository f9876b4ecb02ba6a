//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use finsight_core::{ConfidenceLevel, Transaction, TransactionId, TransactionUpdate};
use finsight_storage::TransactionFilter;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    pub category: Option<String>,
    pub account: Option<String>,
}

/// A stored transaction plus the review flags the list view needs.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub confidence_level: ConfidenceLevel,
    pub needs_review: bool,
    pub imported: bool,
}

impl TransactionView {
    fn new(transaction: Transaction, imported: bool) -> Self {
        Self {
            confidence_level: transaction.confidence_level(),
            needs_review: transaction.needs_review(),
            imported,
            transaction,
        }
    }
}

#[derive(Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionView>,
    pub total: usize,
}

/// GET /api/transactions - newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Json<TransactionListResponse> {
    let filter = TransactionFilter {
        category: params.category.filter(|c| !c.is_empty()),
        account: params.account.filter(|a| !a.is_empty()),
    };

    let store = state.store.lock().await;
    let transactions: Vec<TransactionView> = store
        .list(&filter)
        .into_iter()
        .map(|tx| {
            let imported = store.is_imported(&tx.id);
            TransactionView::new(tx, imported)
        })
        .collect();

    Json(TransactionListResponse {
        total: transactions.len(),
        transactions,
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub merchant: Option<String>,
    pub pending: Option<bool>,
}

/// PATCH /api/transactions/{id}
///
/// A category in the body is a manual choice and pins confidence to 1.0.
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    let id = TransactionId::new(id);
    let mut store = state.store.lock().await;

    if store.get(&id).is_none() {
        return Err(AppError::not_found(&format!("Transaction {} not found", id)));
    }

    if let Some(category) = req.category.as_deref() {
        let category = category.trim();
        if category.is_empty() {
            return Err(AppError::bad_request("Category must not be empty"));
        }
        store
            .confirm_category(&id, category)
            .await
            .map_err(AppError::store)?;
        info!(id = %id, category, "Category confirmed");
    }

    let update = TransactionUpdate {
        category: None,
        subcategory: req.subcategory,
        merchant: req.merchant,
        pending: req.pending,
        confidence: None,
    };
    let updated = store
        .update_transaction(&id, update)
        .await
        .map_err(AppError::store)?;

    Ok(Json(updated))
}

#[derive(Serialize)]
pub struct RecategorizeResponse {
    pub updated: bool,
    pub transaction: Transaction,
}

/// POST /api/transactions/{id}/recategorize
pub async fn recategorize_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RecategorizeResponse>, AppError> {
    let id = TransactionId::new(id);
    let mut store = state.store.lock().await;
    let (updated, transaction) = store
        .recategorize(&id, state.engine.as_ref())
        .await
        .map_err(AppError::store)?;

    Ok(Json(RecategorizeResponse {
        updated,
        transaction,
    }))
}

#[derive(Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// POST /api/transactions/recategorize
pub async fn recategorize_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let mut store = state.store.lock().await;
    let count = store
        .recategorize_all(state.engine.as_ref())
        .await
        .map_err(AppError::store)?;
    Ok(Json(CountResponse { count }))
}

/// DELETE /api/transactions/imported
pub async fn clear_imported_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let mut store = state.store.lock().await;
    let count = store.clear_imported().await.map_err(AppError::store)?;
    Ok(Json(CountResponse { count }))
}

/// DELETE /api/transactions
pub async fn clear_all_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CountResponse>, AppError> {
    let mut store = state.store.lock().await;
    let count = store.transactions().len();
    store.clear_all().await.map_err(AppError::store)?;
    Ok(Json(CountResponse { count }))
}

//! Account, net worth, asset allocation and category handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use finsight_core::{
    asset_allocation, calculate_net_worth, default_categories, Account, AllocationSlice, Category,
    NetWorth,
};

use crate::AppState;

/// GET /api/accounts
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> Json<Vec<Account>> {
    let store = state.store.lock().await;
    Json(store.accounts().to_vec())
}

/// GET /api/net-worth
pub async fn net_worth(State(state): State<Arc<AppState>>) -> Json<NetWorth> {
    let store = state.store.lock().await;
    Json(calculate_net_worth(store.accounts()))
}

/// GET /api/asset-allocation
pub async fn get_asset_allocation(State(state): State<Arc<AppState>>) -> Json<Vec<AllocationSlice>> {
    let store = state.store.lock().await;
    Json(asset_allocation(store.accounts()))
}

/// GET /api/categories
pub async fn list_categories() -> Json<Vec<Category>> {
    Json(default_categories())
}

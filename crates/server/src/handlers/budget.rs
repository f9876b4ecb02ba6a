//! Budget overview and savings goal handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use finsight_core::{
    category_budgets, default_categories, filter_by_date_range, spending_by_category, Budget,
    BudgetPeriod, CategorySpend, DateRange, GoalProgress, PeriodSummary,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    pub period: Option<String>,
}

#[derive(Serialize)]
pub struct BudgetResponse {
    pub period: BudgetPeriod,
    pub label: String,
    pub range: DateRange,
    pub summary: PeriodSummary,
    pub spending: Vec<CategorySpend>,
    pub budgets: Vec<Budget>,
}

/// GET /api/budget?period=current|last|last3
pub async fn budget(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BudgetQuery>,
) -> Result<Json<BudgetResponse>, AppError> {
    let period: BudgetPeriod = match params.period.as_deref() {
        None | Some("") => BudgetPeriod::default(),
        Some(raw) => raw
            .parse::<BudgetPeriod>()
            .map_err(|e| AppError::bad_request(&e))?,
    };

    let today = state.today();
    let range = period.resolve(today);
    let store = state.store.lock().await;
    let in_period = filter_by_date_range(store.transactions(), range);
    let spending = spending_by_category(&in_period);
    let budgets = category_budgets(&default_categories(), &spending, period.months());

    Ok(Json(BudgetResponse {
        period,
        label: period.label(today),
        range,
        summary: PeriodSummary::from_transactions(&in_period),
        spending,
        budgets,
    }))
}

/// GET /api/goals
pub async fn list_goals(State(state): State<Arc<AppState>>) -> Json<Vec<GoalProgress>> {
    let today = state.today();
    Json(
        state
            .goals
            .iter()
            .cloned()
            .map(|goal| GoalProgress::new(goal, today))
            .collect(),
    )
}

//! Budget handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap};
use chrono::Utc;

use crate::{get_owner, ApiResponse, AppError, AppState};
use tally_core::{recommend_budget, ExpenseFilter, RawExpenseRecord};

/// GET /api/budget/recommendations - Monthly limits from the last 3 months
pub async fn budget_recommendations(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<ApiResponse, AppError> {
    let expenses = state
        .store
        .list(&ExpenseFilter::new(get_owner(&headers)))
        .map_err(AppError::from_core)?;
    let records: Vec<RawExpenseRecord> = expenses.iter().map(RawExpenseRecord::from).collect();

    let recommendation = recommend_budget(&records, Utc::now().date_naive())
        .ok_or_else(|| AppError::not_found("No expenses in the last 3 months"))?;

    ApiResponse::new("recommendations", recommendation)
}

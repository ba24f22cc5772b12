//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::{get_owner, ApiResponse, AppError, AppState};
use tally_core::models::parse_timestamp;
use tally_core::store::summarize;
use tally_core::{
    compute_basic_stats, Expense, ExpenseFilter, ExpenseUpdate, NewExpense, RawExpenseRecord,
    SortOrder,
};

/// Query parameters for listing expenses
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    /// Start of window (RFC 3339 or YYYY-MM-DD)
    pub from: Option<String>,
    /// End of window, inclusive (a bare date covers the whole day)
    pub to: Option<String>,
    pub category: Option<String>,
    /// asc (default) or desc
    pub order: Option<String>,
}

/// Query parameters for aggregate endpoints (time window only)
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

fn parse_bound(
    value: Option<&str>,
    name: &str,
    end_of_day: bool,
) -> Result<Option<DateTime<Utc>>, AppError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if end_of_day {
        if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            return Ok(date
                .and_hms_milli_opt(23, 59, 59, 999)
                .map(|naive| naive.and_utc()));
        }
    }

    parse_timestamp(value).map(Some).ok_or_else(|| {
        AppError::bad_request(&format!(
            "Invalid {} date (use YYYY-MM-DD or RFC 3339)",
            name
        ))
    })
}

/// Build a store filter for `owner` from query parameters
pub(crate) fn build_filter(
    owner: String,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<ExpenseFilter, AppError> {
    let from = parse_bound(from, "from", false)?;
    let to = parse_bound(to, "to", true)?;
    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err(AppError::bad_request("from must not be after to"));
        }
    }
    Ok(ExpenseFilter::new(owner).from(from).to(to))
}

/// Expenses for the window, converted for the stats engine. 404 when empty.
pub(crate) fn window_records(
    state: &AppState,
    headers: &HeaderMap,
    params: &WindowQuery,
) -> Result<Vec<RawExpenseRecord>, AppError> {
    let filter = build_filter(
        get_owner(headers),
        params.from.as_deref(),
        params.to.as_deref(),
    )?;
    let expenses = state.store.list(&filter).map_err(AppError::from_core)?;
    if expenses.is_empty() {
        return Err(AppError::not_found("No expenses found for this period"));
    }
    Ok(expenses.iter().map(RawExpenseRecord::from).collect())
}

fn parse_id(id: &str) -> Result<i64, AppError> {
    id.parse()
        .map_err(|_| AppError::bad_request("Expense id must be an integer"))
}

/// GET /api/expenses - List the caller's expenses
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ExpenseQuery>,
) -> Result<ApiResponse, AppError> {
    let order: SortOrder = match params.order.as_deref() {
        Some(order) => order.parse().map_err(AppError::from_core)?,
        None => SortOrder::Asc,
    };

    let filter = build_filter(
        get_owner(&headers),
        params.from.as_deref(),
        params.to.as_deref(),
    )?
    .category(params.category.filter(|c| !c.trim().is_empty()))
    .order(order);

    let expenses = state.store.list(&filter).map_err(AppError::from_core)?;
    ApiResponse::new("expenses", expenses)
}

/// POST /api/expenses - Create an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<NewExpense>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let Json(new) = body.map_err(|e| AppError::bad_request(&e.body_text()))?;
    let owner = get_owner(&headers);

    let expense = state
        .store
        .create(&owner, new)
        .map_err(AppError::from_core)?;
    info!(id = expense.id, owner = %owner, "Expense created");

    Ok(ApiResponse::new("expense", expense)?.with_message("Expense created"))
}

/// GET /api/expenses/:id - Get one expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_id(&id)?;
    let expense = state
        .store
        .get(&get_owner(&headers), id)
        .map_err(AppError::from_core)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    ApiResponse::new("expense", expense)
}

/// PUT /api/expenses/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<ApiResponse, AppError> {
    let id = parse_id(&id)?;
    let Json(update) = body.map_err(|e| AppError::bad_request(&e.body_text()))?;

    let expense = state
        .store
        .update(&get_owner(&headers), id, update)
        .map_err(AppError::from_core)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;

    Ok(ApiResponse::new("expense", expense)?.with_message("Expense updated"))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<ApiResponse, AppError> {
    let id = parse_id(&id)?;
    let owner = get_owner(&headers);

    let expense: Expense = state
        .store
        .get(&owner, id)
        .map_err(AppError::from_core)?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    state
        .store
        .delete(&owner, id)
        .map_err(AppError::from_core)?;
    info!(id, owner = %owner, "Expense deleted");

    Ok(ApiResponse::new("expense", expense)?.with_message("Expense deleted"))
}

/// GET /api/expenses/summary - Totals per category
pub async fn expense_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<WindowQuery>,
) -> Result<ApiResponse, AppError> {
    let filter = build_filter(
        get_owner(&headers),
        params.from.as_deref(),
        params.to.as_deref(),
    )?;
    let expenses = state.store.list(&filter).map_err(AppError::from_core)?;
    if expenses.is_empty() {
        return Err(AppError::not_found("No expenses found for this period"));
    }

    ApiResponse::new("summary", summarize(&expenses, filter.from, filter.to))
}

/// GET /api/expenses/stats - Basic statistics (no AI)
pub async fn expense_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<WindowQuery>,
) -> Result<ApiResponse, AppError> {
    let records = window_records(&state, &headers, &params)?;
    ApiResponse::new("stats", compute_basic_stats(Some(&records)))
}

//! AI analysis handlers
//!
//! Both endpoints always answer 200 when the caller has expenses; `source`
//! tells whether the payload came from the provider or the fallback.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use tracing::debug;

use super::expenses::{window_records, WindowQuery};
use crate::{ApiResponse, AppError, AppState};

/// GET /api/expenses/analysis - Free-form spending analysis
pub async fn expense_analysis(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<WindowQuery>,
) -> Result<ApiResponse, AppError> {
    let records = window_records(&state, &headers, &params)?;

    let outcome = state.analyzer.analyze_expenses(&records).await;
    if let Some(reason) = outcome.reason() {
        debug!(reason = reason.as_str(), "Serving fallback analysis");
    }
    let source = outcome.source();

    Ok(ApiResponse::new("analysis", outcome.into_inner())?.with_source(source))
}

/// GET /api/expenses/insights - Structured six-key insights
pub async fn expense_insights(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<WindowQuery>,
) -> Result<ApiResponse, AppError> {
    let records = window_records(&state, &headers, &params)?;

    let outcome = state.analyzer.get_expense_insights(&records).await;
    if let Some(reason) = outcome.reason() {
        debug!(reason = reason.as_str(), "Serving fallback insights");
    }
    let source = outcome.source();

    Ok(ApiResponse::new("insights", outcome.into_inner())?.with_source(source))
}

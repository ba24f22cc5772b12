//! Health handler

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub ai_available: bool,
    pub ai_provider: String,
}

/// GET /api/health - Liveness and AI provider status
pub async fn health(State(state): State<Arc<AppState>>) -> Result<ApiResponse, AppError> {
    let provider = state.analyzer.provider();
    ApiResponse::new(
        "status",
        HealthStatus {
            status: "ok",
            ai_available: provider.is_available(),
            ai_provider: provider.describe(),
        },
    )
}

//! Tally Web Server
//!
//! Axum-based REST API over the expense store, the statistics engine and the
//! AI analyzer.
//!
//! Every response is a JSON envelope:
//! `{ <payload-key>: ..., success, message?, source? }` where `source` is
//! `"ai"` or `"fallback"` on analysis endpoints.

use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use tally_core::{Error as CoreError, ExpenseAnalyzer, ExpenseStore, OutcomeSource};

mod handlers;

/// Header carrying the caller's user id
pub const OWNER_HEADER: &str = "x-user-id";

/// Owner used when no user header is sent
pub const DEFAULT_OWNER: &str = "local-dev";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn ExpenseStore>,
    pub analyzer: ExpenseAnalyzer,
    pub config: ServerConfig,
}

/// Owner id for a request: the `x-user-id` header, or "local-dev"
pub fn get_owner(headers: &HeaderMap) -> String {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_OWNER)
        .to_string()
}

/// Create the application router
pub fn create_router(
    store: Arc<dyn ExpenseStore>,
    analyzer: ExpenseAnalyzer,
    config: ServerConfig,
) -> Router {
    let state = Arc::new(AppState {
        store,
        analyzer,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Expenses
        .route(
            "/expenses",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route("/expenses/summary", get(handlers::expense_summary))
        .route("/expenses/stats", get(handlers::expense_stats))
        .route("/expenses/analysis", get(handlers::expense_analysis))
        .route("/expenses/insights", get(handlers::expense_insights))
        .route(
            "/expenses/:id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        // Budget
        .route(
            "/budget/recommendations",
            get(handlers::budget_recommendations),
        );

    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let allowed_headers = [
        header::CONTENT_TYPE,
        header::HeaderName::from_static(OWNER_HEADER),
    ];

    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the server
pub async fn serve(
    store: Arc<dyn ExpenseStore>,
    analyzer: ExpenseAnalyzer,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(provider = %analyzer.provider().describe(), "AI analysis provider");

    let app = create_router(store, analyzer, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Successful response envelope
pub struct ApiResponse {
    key: &'static str,
    payload: Value,
    message: Option<String>,
    source: Option<OutcomeSource>,
}

impl ApiResponse {
    pub fn new(key: &'static str, payload: impl Serialize) -> Result<Self, AppError> {
        Ok(Self {
            key,
            payload: serde_json::to_value(payload)?,
            message: None,
            source: None,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_source(mut self, source: OutcomeSource) -> Self {
        self.source = Some(source);
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert(self.key.to_string(), self.payload);
        body.insert("success".to_string(), Value::Bool(true));
        if let Some(message) = self.message {
            body.insert("message".to_string(), Value::String(message));
        }
        if let Some(source) = self.source {
            body.insert(
                "source".to_string(),
                serde_json::to_value(source).unwrap_or(Value::Null),
            );
        }
        (StatusCode::OK, Json(Value::Object(body))).into_response()
    }
}

/// Application error type
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error: invalid input is the caller's fault, anything else
    /// is internal
    pub fn from_core(err: CoreError) -> Self {
        match err {
            CoreError::InvalidData(msg) => Self::bad_request(&msg),
            CoreError::NotFound(msg) => Self::not_found(&msg),
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "success": false,
            "message": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;

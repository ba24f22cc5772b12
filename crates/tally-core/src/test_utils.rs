//! Test utilities for tally-core
//!
//! Provides a mock Gemini server speaking the `generateContent` REST shape,
//! used by integration tests in this crate and in tally-server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::{GeminiBackend, API_KEY_HEADER};

/// How the mock server answers `generateContent` calls
#[derive(Debug, Clone, Default)]
pub enum MockGeminiMode {
    /// Analysis prose, or an insights object (inside a ```json fence) when
    /// the prompt asks for one
    #[default]
    Realistic,
    /// Always answer with this text as the candidate part
    Text(String),
    /// Always fail with this HTTP status
    Status(u16),
}

/// Mock Gemini server for testing
pub struct MockGeminiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port with realistic answers
    pub async fn start() -> Self {
        Self::start_with(MockGeminiMode::Realistic).await
    }

    /// Start the mock server with a fixed answering mode
    pub async fn start_with(mode: MockGeminiMode) -> Self {
        let app = Router::new()
            .route("/v1beta/models/:model_call", post(handle_generate))
            .with_state(Arc::new(mode));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL to pass as `GEMINI_BASE_URL`
    pub fn url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// A Gemini backend pointed at this server
    pub fn backend(&self) -> GeminiBackend {
        GeminiBackend::with_base_url(&self.url(), "test-key", "gemini-test").unwrap()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_generate(
    State(mode): State<Arc<MockGeminiMode>>,
    Path(model_call): Path<String>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> Response {
    if !model_call.ends_with(":generateContent") {
        return (StatusCode::NOT_FOUND, "unknown method").into_response();
    }
    if headers.get(API_KEY_HEADER).is_none() {
        let body = json!({"error": {"code": 401, "message": "missing API key"}});
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    }

    let prompt = request["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();

    let text = match mode.as_ref() {
        MockGeminiMode::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({"error": {"code": code, "message": "mock failure"}});
            return (status, Json(body)).into_response();
        }
        MockGeminiMode::Text(text) => text.clone(),
        MockGeminiMode::Realistic if prompt.contains("quickTip") => {
            let insights = json!({
                "topCategory": "housing",
                "totalSpent": 1250.0,
                "averageTransaction": 312.5,
                "spendingTrend": "increasing",
                "quickTip": "Rent dominates; compare utility plans to free up cash.",
                "riskLevel": "medium"
            });
            format!("```json\n{}\n```", insights)
        }
        MockGeminiMode::Realistic => {
            "## Spending Analysis\nHousing is your largest category.\n\n## Budget Recommendations\nKeep dining under $150."
                .to_string()
        }
    };

    Json(json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

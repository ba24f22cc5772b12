//! Mock backend for testing
//!
//! Returns predictable responses without a running provider. Can be told to
//! return a specific raw body or to fail, so tests can drive every fallback
//! path.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{Error, Result};

use super::types::ProviderResponse;
use super::TextProvider;

/// How the mock answers
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Canned analysis text, or a canned insights object when the prompt asks for JSON
    #[default]
    Canned,
    /// Always return this raw body
    Respond(Value),
    /// Always fail with this message
    Fail(String),
}

/// Mock AI backend for testing
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    pub behavior: MockBehavior,
}

impl MockBackend {
    /// Create a mock that returns canned responses
    pub fn new() -> Self {
        Self {
            behavior: MockBehavior::Canned,
        }
    }

    /// Create a mock that always returns `raw`
    pub fn responding(raw: Value) -> Self {
        Self {
            behavior: MockBehavior::Respond(raw),
        }
    }

    /// Create a mock whose every call fails
    pub fn failing(message: &str) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.to_string()),
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }
}

#[async_trait]
impl TextProvider for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse> {
        match &self.behavior {
            MockBehavior::Canned => {
                // SDK-style nested shape, like a client library wrapper would return
                let text = if prompt.contains("quickTip") {
                    json!({
                        "topCategory": "food",
                        "totalSpent": 100.0,
                        "averageTransaction": 50.0,
                        "spendingTrend": "stable",
                        "quickTip": "Plan meals ahead to trim food spending.",
                        "riskLevel": "low"
                    })
                    .to_string()
                } else {
                    "## Spending Analysis\nMock analysis of your expenses.".to_string()
                };
                Ok(ProviderResponse::new(json!({ "response": { "text": text } })))
            }
            MockBehavior::Respond(raw) => Ok(ProviderResponse::new(raw.clone())),
            MockBehavior::Fail(message) => Err(Error::Provider(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

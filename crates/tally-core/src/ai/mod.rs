//! Pluggable AI provider abstraction
//!
//! The provider is optional: every feature that uses it has a deterministic
//! fallback, so a missing key or a failing service never breaks a request.
//!
//! # Architecture
//!
//! - `TextProvider` trait: one text-generation call returning the raw response
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - `ProviderState`: the once-built availability state injected into
//!   [`crate::analysis::ExpenseAnalyzer`]
//! - `extract`: ordered strategies that pull text out of raw responses
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: gemini (default), openai_compatible, mock, none
//! - `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`
//! - `OPENAI_COMPATIBLE_HOST`, `OPENAI_COMPATIBLE_MODEL`, `OPENAI_COMPATIBLE_API_KEY`

pub mod extract;
mod gemini;
mod mock;
mod openai_compatible;
pub mod parsing;
pub mod types;

pub use extract::{extract_text, extract_value};
pub use gemini::{
    GeminiBackend, API_KEY_HEADER, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL,
};
pub use mock::{MockBackend, MockBehavior};
pub use openai_compatible::{OpenAICompatibleBackend, DEFAULT_OPENAI_COMPATIBLE_MODEL};
pub use types::*;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

use gemini::env_non_empty;

/// Trait implemented by every text-generation backend
///
/// Backends must be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Send one prompt and return the raw response body
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse>;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Gemini generateContent API
    Gemini(GeminiBackend),
    /// OpenAI-compatible chat completions API
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::Gemini(b) => AIClient::Gemini(b.with_model(model)),
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement TextProvider for AIClient by delegating to the inner backend
#[async_trait]
impl TextProvider for AIClient {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse> {
        match self {
            AIClient::Gemini(b) => b.generate(prompt).await,
            AIClient::OpenAICompatible(b) => b.generate(prompt).await,
            AIClient::Mock(b) => b.generate(prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

/// Provider availability, decided once at start-up and never retried
#[derive(Clone)]
pub enum ProviderState {
    /// A client was built and will be used
    Available(AIClient),
    /// No credential was configured
    Absent,
    /// A credential was configured but the client could not be built
    Failed(String),
}

impl ProviderState {
    /// Build the provider state from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): requires GEMINI_API_KEY
    /// - `openai_compatible`: requires OPENAI_COMPATIBLE_HOST
    /// - `mock`: canned responses
    /// - `none`: AI disabled
    pub fn from_env() -> Self {
        let backend = env_non_empty("AI_BACKEND").unwrap_or_else(|| "gemini".to_string());

        let built = match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(|r| r.map(AIClient::Gemini)),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(|r| r.map(AIClient::OpenAICompatible))
            }
            "mock" => Some(Ok(AIClient::mock())),
            "none" | "off" | "disabled" => None,
            _ => {
                warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(|r| r.map(AIClient::Gemini))
            }
        };

        Self::from_result(built)
    }

    /// Map a construction attempt onto a state
    pub fn from_result(built: Option<Result<AIClient>>) -> Self {
        match built {
            Some(Ok(client)) => ProviderState::Available(client),
            Some(Err(e)) => {
                warn!(error = %e, "AI client construction failed, using deterministic analysis");
                ProviderState::Failed(e.to_string())
            }
            None => ProviderState::Absent,
        }
    }

    /// The client, when available
    pub fn client(&self) -> Option<&AIClient> {
        match self {
            ProviderState::Available(client) => Some(client),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ProviderState::Available(_))
    }

    /// One-line description for start-up logs
    pub fn describe(&self) -> String {
        match self {
            ProviderState::Available(client) => {
                format!("{} (model: {})", client.host(), client.model())
            }
            ProviderState::Absent => "not configured".to_string(),
            ProviderState::Failed(reason) => format!("unavailable ({})", reason),
        }
    }
}

impl From<AIClient> for ProviderState {
    fn from(client: AIClient) -> Self {
        ProviderState::Available(client)
    }
}

//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API
//! (vLLM, LocalAI, llama-server, Docker Model Runner, hosted OpenAI).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::gemini::env_non_empty;
use super::types::ProviderResponse;
use super::TextProvider;

pub const DEFAULT_OPENAI_COMPATIBLE_MODEL: &str = "gpt-4o-mini";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>) -> Result<Self> {
        let http_client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(String::from),
        })
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    pub fn from_env() -> Option<Result<Self>> {
        let host = env_non_empty("OPENAI_COMPATIBLE_HOST")?;
        let model = env_non_empty("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|| DEFAULT_OPENAI_COMPATIBLE_MODEL.to_string());
        let api_key = env_non_empty("OPENAI_COMPATIBLE_API_KEY");
        Some(Self::new(&host, &model, api_key.as_deref()))
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[async_trait]
impl TextProvider for OpenAICompatibleBackend {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: Some(0.7),
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;
        debug!(model = %self.model, "OpenAI-compatible response received");

        Ok(ProviderResponse::new(body))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

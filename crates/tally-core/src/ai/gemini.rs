//! Gemini backend implementation
//!
//! Calls the Gemini `generateContent` REST endpoint and hands back the raw
//! response body. Text extraction happens in [`super::extract`].
//!
//! # Configuration
//!
//! Environment variables:
//! - `GEMINI_API_KEY`: API key (required)
//! - `GEMINI_MODEL`: Model name (default: gemini-1.5-flash)
//! - `GEMINI_BASE_URL`: API base URL (default: Google's v1beta endpoint)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::types::ProviderResponse;
use super::TextProvider;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key. Kept out of the URL so request errors never echo it.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend against the public endpoint
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        Self::with_base_url(DEFAULT_GEMINI_BASE_URL, api_key, model)
    }

    /// Create a backend against a custom base URL (proxies, mock servers)
    pub fn with_base_url(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http_client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Create from environment variables
    ///
    /// Returns `None` when `GEMINI_API_KEY` is unset or blank, and
    /// `Some(Err(..))` when the HTTP client could not be built.
    pub fn from_env() -> Option<Result<Self>> {
        let api_key = env_non_empty("GEMINI_API_KEY")?;
        let model =
            env_non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let base_url =
            env_non_empty("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());
        Some(Self::with_base_url(&base_url, &api_key, &model))
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

pub(crate) fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[async_trait]
impl TextProvider for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<ProviderResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http_client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Http(e.without_url()))?;
        debug!(model = %self.model, "Gemini response received");

        Ok(ProviderResponse::new(body))
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

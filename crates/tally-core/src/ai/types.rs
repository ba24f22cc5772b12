//! AI provider response types
//!
//! These types are backend-agnostic and used across all provider implementations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw, untrusted response body from a provider.
///
/// Backends hand back whatever JSON the service returned; text is pulled out
/// by [`super::extract::extract_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub raw: Value,
}

impl ProviderResponse {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }
}

/// Which extraction strategy produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// `response.candidates[0].content.parts[*].text`
    NestedAccessor,
    /// `response.text`
    NestedText,
    /// `text`
    TopLevelText,
    /// `candidates[0].content.parts[*].text`
    Candidates,
    /// `choices[0].message.content`
    ChatChoices,
    /// No known shape matched; the whole value was serialized
    Serialized,
    /// The response was null
    Empty,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::NestedAccessor => "nested_accessor",
            ExtractionStrategy::NestedText => "nested_text",
            ExtractionStrategy::TopLevelText => "top_level_text",
            ExtractionStrategy::Candidates => "candidates",
            ExtractionStrategy::ChatChoices => "chat_choices",
            ExtractionStrategy::Serialized => "serialized",
            ExtractionStrategy::Empty => "empty",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text pulled out of a provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub strategy: ExtractionStrategy,
}

//! Response-text extraction
//!
//! Provider responses come in several shapes (SDK-style wrappers, raw Gemini
//! REST bodies, OpenAI chat completions, plain `{"text": ...}`). Extraction
//! walks an ordered list of strategies and takes the first that yields a
//! string. When nothing matches, the whole response is serialized so callers
//! always get text back.

use serde_json::Value;

use super::types::{ExtractedText, ExtractionStrategy, ProviderResponse};

type Probe = fn(&Value) -> Option<String>;

/// Probing order, first match wins
const STRATEGIES: &[(ExtractionStrategy, Probe)] = &[
    (ExtractionStrategy::NestedAccessor, nested_accessor),
    (ExtractionStrategy::NestedText, nested_text),
    (ExtractionStrategy::TopLevelText, top_level_text),
    (ExtractionStrategy::Candidates, candidates_text),
    (ExtractionStrategy::ChatChoices, chat_choices),
];

/// Extract text from a provider response
pub fn extract_text(response: &ProviderResponse) -> ExtractedText {
    extract_value(&response.raw)
}

/// Extract text from an arbitrary JSON value
pub fn extract_value(raw: &Value) -> ExtractedText {
    if raw.is_null() {
        return ExtractedText {
            text: String::new(),
            strategy: ExtractionStrategy::Empty,
        };
    }

    for (strategy, probe) in STRATEGIES {
        if let Some(text) = probe(raw) {
            return ExtractedText {
                text,
                strategy: *strategy,
            };
        }
    }

    let text = match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    ExtractedText {
        text,
        strategy: ExtractionStrategy::Serialized,
    }
}

/// Equivalent of an SDK `response.text()` accessor on a nested response
fn nested_accessor(raw: &Value) -> Option<String> {
    raw.get("response").and_then(candidates_text)
}

fn nested_text(raw: &Value) -> Option<String> {
    raw.get("response")?.get("text")?.as_str().map(String::from)
}

fn top_level_text(raw: &Value) -> Option<String> {
    raw.get("text")?.as_str().map(String::from)
}

/// Concatenated text parts of the first candidate
fn candidates_text(raw: &Value) -> Option<String> {
    let parts = raw
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let texts: Vec<&str> = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

fn chat_choices(raw: &Value) -> Option<String> {
    raw.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_is_empty() {
        let extracted = extract_value(&Value::Null);
        assert_eq!(extracted.text, "");
        assert_eq!(extracted.strategy, ExtractionStrategy::Empty);
    }

    #[test]
    fn test_nested_accessor_beats_nested_text() {
        let raw = json!({
            "response": {
                "text": "plain",
                "candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}]
            },
            "text": "top"
        });
        let extracted = extract_value(&raw);
        assert_eq!(extracted.text, "Hello world");
        assert_eq!(extracted.strategy, ExtractionStrategy::NestedAccessor);
    }

    #[test]
    fn test_nested_text_beats_top_level() {
        let raw = json!({"response": {"text": "nested"}, "text": "top"});
        let extracted = extract_value(&raw);
        assert_eq!(extracted.text, "nested");
        assert_eq!(extracted.strategy, ExtractionStrategy::NestedText);
    }

    #[test]
    fn test_top_level_text() {
        let raw = json!({"response": {"text": 42}, "text": "top"});
        let extracted = extract_value(&raw);
        assert_eq!(extracted.text, "top");
        assert_eq!(extracted.strategy, ExtractionStrategy::TopLevelText);
    }

    #[test]
    fn test_raw_gemini_body() {
        let raw = json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "analysis"}]}}],
            "usageMetadata": {"totalTokenCount": 10}
        });
        let extracted = extract_value(&raw);
        assert_eq!(extracted.text, "analysis");
        assert_eq!(extracted.strategy, ExtractionStrategy::Candidates);
    }

    #[test]
    fn test_chat_completion_body() {
        let raw = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        let extracted = extract_value(&raw);
        assert_eq!(extracted.text, "hi");
        assert_eq!(extracted.strategy, ExtractionStrategy::ChatChoices);
    }

    #[test]
    fn test_unknown_shape_serializes() {
        let raw = json!({"output": [1, 2]});
        let extracted = extract_value(&raw);
        assert_eq!(extracted.text, r#"{"output":[1,2]}"#);
        assert_eq!(extracted.strategy, ExtractionStrategy::Serialized);
    }

    #[test]
    fn test_bare_string_is_returned_unquoted() {
        let extracted = extract_value(&json!("just text"));
        assert_eq!(extracted.text, "just text");
        assert_eq!(extracted.strategy, ExtractionStrategy::Serialized);
    }

    #[test]
    fn test_candidates_without_text_parts_fall_through() {
        let raw = json!({"candidates": [{"content": {"parts": [{"inlineData": {}}]}}]});
        let extracted = extract_value(&raw);
        assert_eq!(extracted.strategy, ExtractionStrategy::Serialized);
    }
}

//! JSON parsing helpers for AI provider responses
//!
//! Models often wrap the JSON payload in prose or markdown code fences, so the
//! outermost object is located before parsing.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::ExpenseInsights;

/// Keys the insights object must carry
pub const INSIGHT_KEYS: [&str; 6] = [
    "topCategory",
    "totalSpent",
    "averageTransaction",
    "spendingTrend",
    "quickTip",
    "riskLevel",
];

/// Locate the outermost JSON object in a model response
pub fn find_json_object(response: &str) -> Option<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Some(&response[s..=e]),
        _ => None,
    }
}

/// Parse an insights object from AI response text
pub fn parse_insights(response: &str) -> Result<ExpenseInsights> {
    let json_str = find_json_object(response).ok_or_else(|| {
        Error::InvalidData(format!(
            "No JSON found in AI insights response | Raw: {}",
            truncate(response.trim(), 200)
        ))
    })?;

    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid insights JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str, 200)
        ))
    })?;

    let missing: Vec<&str> = INSIGHT_KEYS
        .iter()
        .copied()
        .filter(|key| value.get(key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(Error::InvalidData(format!(
            "Insights JSON missing keys: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value)
        .map_err(|e| Error::InvalidData(format!("Insights JSON has wrong types: {}", e)))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

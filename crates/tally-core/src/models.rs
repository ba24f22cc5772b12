//! Data models for Tally

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Expense record as supplied by the persistence layer or a JSON file.
///
/// Deserialization is lenient: `amount` keeps whatever JSON value was sent
/// (coerced later by the stats engine), unparsable timestamps become `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExpenseRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default)]
    pub amount: Value,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
}

impl RawExpenseRecord {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount: Value::from(amount),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

/// Expense record after defaulting and coercion, ready for aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedExpenseRecord {
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub date: Option<DateTime<Utc>>,
}

/// Direction of spending across the input window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingTrend {
    #[serde(alias = "Increasing", alias = "INCREASING")]
    Increasing,
    #[serde(alias = "Decreasing", alias = "DECREASING")]
    Decreasing,
    #[serde(alias = "Stable", alias = "STABLE")]
    Stable,
}

impl SpendingTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingTrend::Increasing => "increasing",
            SpendingTrend::Decreasing => "decreasing",
            SpendingTrend::Stable => "stable",
        }
    }
}

impl fmt::Display for SpendingTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SpendingTrend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "increasing" => Ok(SpendingTrend::Increasing),
            "decreasing" => Ok(SpendingTrend::Decreasing),
            "stable" => Ok(SpendingTrend::Stable),
            _ => Err(format!("Unknown spending trend: {}", s)),
        }
    }
}

/// Risk level derived from total spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(format!("Unknown risk level: {}", s)),
        }
    }
}

/// Structured insight object returned by the insights operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInsights {
    pub top_category: Option<String>,
    pub total_spent: f64,
    pub average_transaction: f64,
    pub spending_trend: SpendingTrend,
    pub quick_tip: String,
    pub risk_level: RiskLevel,
}

/// A stored expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub owner: String,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Expense> for RawExpenseRecord {
    fn from(expense: &Expense) -> Self {
        Self {
            description: expense.description.clone(),
            amount: Value::from(expense.amount),
            category: expense.category.clone(),
            created_at: Some(expense.created_at),
            date: None,
        }
    }
}

/// Input for creating an expense
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    /// Defaults to now
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update for an expense (absent fields are left unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Spending in one category within a summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub count: usize,
    /// Share of the total, 0-100
    pub percentage: f64,
}

/// Expense summary for a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub total_amount: f64,
    pub count: usize,
    pub categories: Vec<CategoryTotal>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Parse a timestamp in any of the formats expense sources use
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_timestamp(&s),
        // Epoch milliseconds
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}

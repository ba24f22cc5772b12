//! Deterministic expense statistics
//!
//! `compute_basic_stats` normalizes raw expense records and derives the
//! aggregates every other feature builds on: totals, per-category breakdown,
//! top category, spending trend and risk level. It is pure and never fails,
//! so it doubles as the fallback when no AI provider is reachable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{NormalizedExpenseRecord, RawExpenseRecord, RiskLevel, SpendingTrend};

/// Category used when a record has none
pub const DEFAULT_CATEGORY: &str = "others";

/// Totals above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 2000.0;

/// Totals above this (and not high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 800.0;

/// Last third must exceed the first third by this factor to count as increasing
const INCREASING_FACTOR: f64 = 1.05;

/// Last third must fall below the first third by this factor to count as decreasing
const DECREASING_FACTOR: f64 = 0.95;

/// Aggregate statistics for a list of expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub normalized: Vec<NormalizedExpenseRecord>,
    pub total_amount: f64,
    /// Rounded half-up to cents
    pub average_transaction: f64,
    pub top_category: Option<String>,
    pub spending_trend: SpendingTrend,
    pub category_breakdown: BTreeMap<String, f64>,
    pub risk_level: RiskLevel,
}

impl StatsSummary {
    pub fn count(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Compute normalized records and aggregate statistics.
///
/// `None` is treated as an empty list. Input order is assumed to be
/// chronological (oldest first) for trend detection.
pub fn compute_basic_stats(expenses: Option<&[RawExpenseRecord]>) -> StatsSummary {
    let expenses = expenses.unwrap_or_default();
    let normalized: Vec<NormalizedExpenseRecord> = expenses.iter().map(normalize).collect();

    let total_amount: f64 = normalized.iter().map(|e| e.amount).sum();
    let count = normalized.len();
    let average_transaction = if count > 0 {
        round_cents(total_amount / count as f64)
    } else {
        0.0
    };

    // Insertion order is tracked so ties resolve to the first category seen
    let mut ordered: Vec<(String, f64)> = Vec::new();
    for record in &normalized {
        match ordered.iter_mut().find(|(c, _)| *c == record.category) {
            Some((_, sum)) => *sum += record.amount,
            None => ordered.push((record.category.clone(), record.amount)),
        }
    }

    let top_category = top_category(&ordered);
    let spending_trend = spending_trend(&normalized);
    let risk_level = risk_level(total_amount);

    StatsSummary {
        normalized,
        total_amount,
        average_transaction,
        top_category,
        spending_trend,
        category_breakdown: ordered.into_iter().collect(),
        risk_level,
    }
}

/// Apply defaulting and coercion to one record
pub fn normalize(record: &RawExpenseRecord) -> NormalizedExpenseRecord {
    let category = match record.category.as_deref() {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    };

    NormalizedExpenseRecord {
        description: record.description.clone(),
        amount: coerce_amount(&record.amount),
        category,
        date: record.created_at.or(record.date),
    }
}

/// Coerce a JSON value to an amount.
///
/// Numbers pass through, numeric strings are parsed (blank is 0), booleans
/// become 1/0, anything else (including NaN or infinite results) is 0.
pub fn coerce_amount(value: &Value) -> f64 {
    let amount = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };

    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

/// Round half-up to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Category with the highest sum; the first inserted wins a tie
fn top_category(ordered: &[(String, f64)]) -> Option<String> {
    let mut best: Option<&(String, f64)> = None;
    for entry in ordered {
        match best {
            Some((_, sum)) if entry.1 <= *sum => {}
            _ => best = Some(entry),
        }
    }
    best.map(|(category, _)| category.clone())
}

fn spending_trend(normalized: &[NormalizedExpenseRecord]) -> SpendingTrend {
    let n = normalized.len();
    if n < 3 {
        return SpendingTrend::Stable;
    }

    let third = (n / 3).max(1);
    let first_sum: f64 = normalized[..third].iter().map(|e| e.amount).sum();
    let last_sum: f64 = normalized[n - third..].iter().map(|e| e.amount).sum();

    if last_sum > first_sum * INCREASING_FACTOR {
        SpendingTrend::Increasing
    } else if last_sum < first_sum * DECREASING_FACTOR {
        SpendingTrend::Decreasing
    } else {
        SpendingTrend::Stable
    }
}

/// Risk level for a total spend
pub fn risk_level(total_amount: f64) -> RiskLevel {
    if total_amount > HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if total_amount > MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

//! Expense analysis with optional AI and deterministic fallback
//!
//! `ExpenseAnalyzer` always computes [`StatsSummary`] first. With a provider
//! available it sends one prompt and returns the model's output; without one,
//! or when the call or parse fails, it returns output of the same shape built
//! from the statistics alone. Neither operation ever returns an error.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ai::parsing::parse_insights;
use crate::ai::{extract_text, ProviderState, TextProvider};
use crate::models::{ExpenseInsights, RawExpenseRecord};
use crate::prompts::{PromptId, PromptLibrary};
use crate::stats::{compute_basic_stats, StatsSummary};

/// Why the deterministic output was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No provider configured, or its client failed to build
    ProviderUnavailable,
    /// The provider call errored
    ProviderCallFailure(String),
    /// The provider answered but the text was not a valid insights object
    ParseFailure(String),
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::ProviderUnavailable => "provider_unavailable",
            FallbackReason::ProviderCallFailure(_) => "provider_call_failure",
            FallbackReason::ParseFailure(_) => "parse_failure",
        }
    }
}

/// Where an outcome came from, for API consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeSource {
    Ai,
    Fallback,
}

/// Result of an analysis: either generated by the provider or computed
/// deterministically. Both variants carry a payload of the same type.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Generated(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Generated(value) => value,
            Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Outcome::Generated(value) => value,
            Outcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Outcome::Generated(_) => None,
            Outcome::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn source(&self) -> OutcomeSource {
        if self.is_fallback() {
            OutcomeSource::Fallback
        } else {
            OutcomeSource::Ai
        }
    }
}

/// Text synthesizer over the stats engine and an optional provider
#[derive(Clone)]
pub struct ExpenseAnalyzer {
    provider: ProviderState,
    prompts: PromptLibrary,
}

impl ExpenseAnalyzer {
    /// Create an analyzer using embedded prompts
    pub fn new(provider: impl Into<ProviderState>) -> Self {
        Self {
            provider: provider.into(),
            prompts: PromptLibrary::embedded_only(),
        }
    }

    /// Create an analyzer with a specific prompt library
    pub fn with_prompts(provider: impl Into<ProviderState>, prompts: PromptLibrary) -> Self {
        Self {
            provider: provider.into(),
            prompts,
        }
    }

    /// Analyzer with no provider (deterministic output only)
    pub fn deterministic() -> Self {
        Self::new(ProviderState::Absent)
    }

    /// Build from environment variables (provider + prompt overrides)
    pub fn from_env() -> Self {
        let provider = ProviderState::from_env();
        info!(provider = %provider.describe(), "AI provider");

        let prompts = PromptLibrary::new().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load prompt overrides, using embedded prompts");
            PromptLibrary::embedded_only()
        });

        Self::with_prompts(provider, prompts)
    }

    pub fn provider(&self) -> &ProviderState {
        &self.provider
    }

    /// Produce a free-form analysis of the expenses
    pub async fn analyze_expenses(&self, expenses: &[RawExpenseRecord]) -> Outcome<String> {
        let stats = compute_basic_stats(Some(expenses));

        let Some(client) = self.provider.client() else {
            return Outcome::Fallback {
                value: basic_analysis(&stats),
                reason: FallbackReason::ProviderUnavailable,
            };
        };

        let prompt = self
            .prompts
            .render(PromptId::AnalyzeExpenses, &analysis_vars(&stats));
        debug!(prompt_len = prompt.len(), "Sending analysis prompt");

        match client.generate(&prompt).await {
            Ok(response) => {
                let extracted = extract_text(&response);
                debug!(strategy = %extracted.strategy, "Extracted analysis text");
                Outcome::Generated(extracted.text)
            }
            Err(e) => {
                warn!(error = %e, model = client.model(), "AI analysis failed, using basic stats");
                Outcome::Fallback {
                    value: failure_summary(&stats),
                    reason: FallbackReason::ProviderCallFailure(e.to_string()),
                }
            }
        }
    }

    /// Produce the six-key insights object
    pub async fn get_expense_insights(
        &self,
        expenses: &[RawExpenseRecord],
    ) -> Outcome<ExpenseInsights> {
        let stats = compute_basic_stats(Some(expenses));

        let Some(client) = self.provider.client() else {
            return Outcome::Fallback {
                value: basic_insights(&stats, TipKind::Basic),
                reason: FallbackReason::ProviderUnavailable,
            };
        };

        let prompt = self
            .prompts
            .render(PromptId::ExpenseInsights, &insight_vars(&stats));
        debug!(prompt_len = prompt.len(), "Sending insights prompt");

        let response = match client.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, model = client.model(), "AI insights failed, using basic stats");
                return Outcome::Fallback {
                    value: basic_insights(&stats, TipKind::CallFailed),
                    reason: FallbackReason::ProviderCallFailure(e.to_string()),
                };
            }
        };

        let extracted = extract_text(&response);
        debug!(strategy = %extracted.strategy, "Extracted insights text");

        match parse_insights(&extracted.text) {
            Ok(insights) => Outcome::Generated(insights),
            Err(e) => {
                warn!(error = %e, "AI insights were not valid JSON, using basic stats");
                Outcome::Fallback {
                    value: basic_insights(&stats, TipKind::ParseFailed),
                    reason: FallbackReason::ParseFailure(e.to_string()),
                }
            }
        }
    }
}

fn analysis_vars(stats: &StatsSummary) -> HashMap<&'static str, String> {
    let mut vars = HashMap::new();
    vars.insert("expenses", expenses_json(stats));
    vars.insert("total", format!("{:.2}", stats.total_amount));
    vars.insert("count", stats.count().to_string());
    vars.insert(
        "breakdown",
        serde_json::to_string(&stats.category_breakdown).unwrap_or_default(),
    );
    vars
}

fn insight_vars(stats: &StatsSummary) -> HashMap<&'static str, String> {
    let mut vars = analysis_vars(stats);
    vars.insert("average", format!("{:.2}", stats.average_transaction));
    vars.insert(
        "top_category",
        stats.top_category.clone().unwrap_or_else(|| "none".into()),
    );
    vars.insert("trend", stats.spending_trend.to_string());
    vars.insert("risk", stats.risk_level.to_string());
    vars
}

fn expenses_json(stats: &StatsSummary) -> String {
    serde_json::to_string_pretty(&stats.normalized).unwrap_or_else(|_| "[]".to_string())
}

/// Multi-line narrative used when no provider is configured
pub fn basic_analysis(stats: &StatsSummary) -> String {
    let top = stats.top_category.as_deref().unwrap_or("N/A");
    let action = match stats.top_category.as_deref() {
        Some(category) => format!(
            "Review your {} spending and set a monthly limit for it.",
            category
        ),
        None => "Start logging expenses with categories to find savings opportunities."
            .to_string(),
    };

    format!(
        "Expense Analysis (basic statistics)\n\
         Total spent: ${:.2}\n\
         Top category: {}\n\
         Average transaction: ${:.2}\n\
         Spending trend: {}\n\
         Suggested action: {}",
        stats.total_amount, top, stats.average_transaction, stats.spending_trend, action
    )
}

/// Single-line summary used when the provider call fails
pub fn failure_summary(stats: &StatsSummary) -> String {
    format!(
        "AI analysis unavailable. Total: ${:.2}, top category: {}, average: ${:.2}, trend: {}.",
        stats.total_amount,
        stats.top_category.as_deref().unwrap_or("N/A"),
        stats.average_transaction,
        stats.spending_trend
    )
}

/// Which fallback path produced the insights (tip wording differs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipKind {
    Basic,
    ParseFailed,
    CallFailed,
}

/// Deterministic insights object
pub fn basic_insights(stats: &StatsSummary, kind: TipKind) -> ExpenseInsights {
    let quick_tip = match (kind, stats.top_category.as_deref()) {
        (TipKind::Basic, Some(c)) => format!("Consider setting a monthly budget for {}.", c),
        (TipKind::Basic, None) => {
            "Track your expenses regularly to spot savings opportunities.".to_string()
        }
        (TipKind::ParseFailed, Some(c)) => format!("Keep an eye on your {} spending.", c),
        (TipKind::ParseFailed, None) => {
            "Review your recent expenses to find savings.".to_string()
        }
        (TipKind::CallFailed, Some(c)) => {
            format!("Try reducing {} expenses to boost your savings.", c)
        }
        (TipKind::CallFailed, None) => {
            "Set a simple monthly budget to stay on track.".to_string()
        }
    };

    ExpenseInsights {
        top_category: stats.top_category.clone(),
        total_spent: stats.total_amount,
        average_transaction: stats.average_transaction,
        spending_trend: stats.spending_trend,
        quick_tip,
        risk_level: stats.risk_level,
    }
}

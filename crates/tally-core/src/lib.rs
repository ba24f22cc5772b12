//! Tally Core Library
//!
//! Shared functionality for the Tally expense tracker:
//! - Statistics engine over loosely-typed expense records
//! - Optional AI analysis (Gemini, OpenAI-compatible, mock) with a
//!   deterministic fallback for every operation
//! - Prompt library with on-disk overrides
//! - Budget recommendations
//! - In-memory expense store

pub mod ai;
pub mod analysis;
pub mod budget;
pub mod error;
pub mod models;
pub mod prompts;
pub mod stats;
pub mod store;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, ExtractedText, ExtractionStrategy, GeminiBackend, MockBackend,
    OpenAICompatibleBackend, ProviderResponse, ProviderState, TextProvider,
};
pub use analysis::{ExpenseAnalyzer, FallbackReason, Outcome, OutcomeSource};
pub use budget::{recommend_budget, BudgetRecommendation, CategoryBudget};
pub use error::{Error, Result};
pub use models::{
    CategoryTotal, Expense, ExpenseInsights, ExpenseSummary, ExpenseUpdate, NewExpense,
    NormalizedExpenseRecord, RawExpenseRecord, RiskLevel, SpendingTrend,
};
pub use prompts::{PromptId, PromptLibrary};
pub use stats::{compute_basic_stats, StatsSummary};
pub use store::{ExpenseFilter, ExpenseStore, InMemoryStore, SortOrder};

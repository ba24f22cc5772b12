//! Prompt library for AI analysis
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for an override in the prompts dir (`TALLY_PROMPTS_DIR`, else
//!    ~/.local/share/tally/prompts/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Templates use `{{var}}` placeholders.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const ANALYZE_EXPENSES: &str = r#"You are a friendly personal finance assistant. Review the user's expenses below and give practical, encouraging advice.

Expenses (JSON, oldest first):
{{expenses}}

Summary:
- Total spent: ${{total}}
- Number of transactions: {{count}}
- Spending by category: {{breakdown}}

Please respond in a friendly, supportive tone with these six sections:
1. Spending Analysis: patterns and notable categories
2. Budget Recommendations: realistic limits per category
3. Money-Saving Tips: specific, actionable ideas
4. Financial Goals: short and long term goals worth setting
5. Emergency Fund Advice: how much to set aside and how to get there
6. Investment Opportunities: beginner-friendly options suited to this spending profile
"#;

    pub const EXPENSE_INSIGHTS: &str = r#"Analyze these expenses and respond with ONLY a JSON object, no other text.

Expenses (JSON, oldest first):
{{expenses}}

Computed figures:
- Total spent: {{total}}
- Average transaction: {{average}}
- Top category: {{top_category}}
- Spending trend: {{trend}}
- Risk level: {{risk}}

Return exactly these keys:
{"topCategory": string or null, "totalSpent": number, "averageTransaction": number, "spendingTrend": "increasing" | "decreasing" | "stable", "quickTip": string, "riskLevel": "low" | "medium" | "high"}
"#;
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Free-form six-section analysis
    AnalyzeExpenses,
    /// Six-key JSON insights object
    ExpenseInsights,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzeExpenses => "analyze_expenses",
            Self::ExpenseInsights => "expense_insights",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[Self::AnalyzeExpenses, Self::ExpenseInsights]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::AnalyzeExpenses => defaults::ANALYZE_EXPENSES,
            Self::ExpenseInsights => defaults::EXPENSE_INSIGHTS,
        }
    }
}

/// Loaded prompt templates, resolved once
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<PromptId, String>,
    overrides: Vec<PromptId>,
}

impl PromptLibrary {
    /// Load prompts, honouring overrides in the default prompts dir
    pub fn new() -> Result<Self> {
        Self::load(default_prompts_dir().as_deref())
    }

    /// Embedded defaults only
    pub fn embedded_only() -> Self {
        let templates = PromptId::all()
            .iter()
            .map(|&id| (id, id.default_content().to_string()))
            .collect();
        Self {
            templates,
            overrides: vec![],
        }
    }

    /// Load prompts with overrides from `override_dir` (if it exists)
    pub fn load(override_dir: Option<&Path>) -> Result<Self> {
        let mut library = Self::embedded_only();

        let Some(dir) = override_dir else {
            return Ok(library);
        };

        for &id in PromptId::all() {
            let path = dir.join(format!("{}.md", id.as_str()));
            if path.exists() {
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::InvalidData(format!(
                        "Failed to read prompt override {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                debug!(prompt = id.as_str(), path = %path.display(), "Using prompt override");
                library.templates.insert(id, content);
                library.overrides.push(id);
            }
        }

        Ok(library)
    }

    /// Whether a prompt came from an override file
    pub fn is_override(&self, id: PromptId) -> bool {
        self.overrides.contains(&id)
    }

    /// Render a prompt with template variables replaced
    pub fn render(&self, id: PromptId, vars: &HashMap<&str, String>) -> String {
        let template = self
            .templates
            .get(&id)
            .map(String::as_str)
            .unwrap_or_else(|| id.default_content());
        render_template(template, vars)
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::embedded_only()
    }
}

/// Simple mustache-style replacement: {{var}}
pub fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_PROMPTS_DIR") {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::data_local_dir().map(|d| d.join("tally").join("prompts"))
}

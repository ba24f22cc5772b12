//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `report` - Offline reports over a data file (stats, analyze, insights, budget)
//! - `serve` - Web server command

pub mod report;
pub mod serve;

pub use report::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::store::load_records;
use tally_core::RawExpenseRecord;

/// Load expense records from a JSON data file
pub fn load_expenses(path: &Path) -> Result<Vec<RawExpenseRecord>> {
    if !path.exists() {
        anyhow::bail!(
            "Expense file not found: {} (pass --data <file.json>)",
            path.display()
        );
    }
    load_records(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Truncate a string for table output
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

//! CLI command tests

use std::io::Write;

use tally_core::{ExpenseFilter, ExpenseStore, FallbackReason, Outcome};
use tempfile::NamedTempFile;

use crate::commands::{self, truncate};

fn write_data(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

fn sample_file() -> NamedTempFile {
    write_data(
        r#"[
            {"description": "Rent", "amount": 900, "category": "housing", "createdAt": "2024-04-01T09:00:00Z"},
            {"description": "Groceries", "amount": "82.40", "category": "food", "date": "2024-05-03"},
            {"description": "Cinema", "amount": 14, "createdAt": "2024-05-20"},
            {"description": "Mystery", "amount": null}
        ]"#,
    )
}

// ========== Data Loading ==========

#[test]
fn test_load_expenses() {
    let file = sample_file();
    let expenses = commands::load_expenses(file.path()).unwrap();
    assert_eq!(expenses.len(), 4);
    assert_eq!(expenses[1].description, "Groceries");
}

#[test]
fn test_load_expenses_missing_file() {
    let err = commands::load_expenses(std::path::Path::new("/nonexistent/expenses.json"))
        .unwrap_err();
    assert!(err.to_string().contains("--data"));
}

#[test]
fn test_load_expenses_not_an_array() {
    let file = write_data(r#"{"description": "single"}"#);
    assert!(commands::load_expenses(file.path()).is_err());
}

// ========== Report Commands ==========

#[test]
fn test_cmd_stats() {
    let file = sample_file();
    assert!(commands::cmd_stats(file.path(), false).is_ok());
    assert!(commands::cmd_stats(file.path(), true).is_ok());
}

#[test]
fn test_cmd_stats_empty_file() {
    let file = write_data("[]");
    assert!(commands::cmd_stats(file.path(), false).is_ok());
}

#[tokio::test]
async fn test_cmd_analyze_and_insights() {
    let file = sample_file();
    assert!(commands::cmd_analyze(file.path()).await.is_ok());
    assert!(commands::cmd_insights(file.path(), false).await.is_ok());
    assert!(commands::cmd_insights(file.path(), true).await.is_ok());
}

#[test]
fn test_cmd_budget() {
    let file = sample_file();
    assert!(commands::cmd_budget(file.path(), Some("2024-05-31"), false).is_ok());
    assert!(commands::cmd_budget(file.path(), Some("2024-05-31"), true).is_ok());
    // Nothing in the window
    assert!(commands::cmd_budget(file.path(), Some("2020-01-01"), false).is_ok());
}

#[test]
fn test_cmd_budget_invalid_date() {
    let file = sample_file();
    let err = commands::cmd_budget(file.path(), Some("31/05/2024"), false).unwrap_err();
    assert!(err.to_string().contains("YYYY-MM-DD"));
}

#[test]
fn test_resolve_today() {
    let date = commands::resolve_today(Some("2024-02-29")).unwrap();
    assert_eq!(date.to_string(), "2024-02-29");
    assert!(commands::resolve_today(None).is_ok());
}

#[test]
fn test_source_note() {
    let generated: Outcome<String> = Outcome::Generated("x".into());
    assert!(commands::source_note(&generated).contains("AI"));

    let failed: Outcome<String> = Outcome::Fallback {
        value: "x".into(),
        reason: FallbackReason::ProviderCallFailure("timeout".into()),
    };
    assert!(commands::source_note(&failed).contains("timeout"));
}

// ========== Serve ==========

#[test]
fn test_open_store_seeds_from_file() {
    let file = sample_file();
    let store = commands::open_store(file.path()).unwrap();
    let expenses = store.list(&ExpenseFilter::new("local-dev")).unwrap();
    assert_eq!(expenses.len(), 4);
    assert_eq!(expenses[0].description, "Rent");
    assert_eq!(expenses[1].amount, 82.4);
}

#[test]
fn test_open_store_without_file() {
    let store = commands::open_store(std::path::Path::new("/nonexistent/expenses.json")).unwrap();
    assert!(store
        .list(&ExpenseFilter::new("local-dev"))
        .unwrap()
        .is_empty());
}

// ========== Helpers ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("food", 10), "food");
    assert_eq!(truncate("entertainment", 8), "enter...");
}

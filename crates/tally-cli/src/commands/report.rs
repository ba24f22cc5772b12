//! Report command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tally_core::{
    compute_basic_stats, recommend_budget, ExpenseAnalyzer, FallbackReason, Outcome,
};

use super::{load_expenses, truncate};

pub fn cmd_stats(data: &Path, json: bool) -> Result<()> {
    let expenses = load_expenses(data)?;
    let stats = compute_basic_stats(Some(&expenses));

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("📊 Spending Statistics");
    println!("   ─────────────────────────────────────────────");

    if stats.is_empty() {
        println!("   No expenses in {}", data.display());
        return Ok(());
    }

    println!("   Transactions:  {}", stats.count());
    println!("   Total:         ${:.2}", stats.total_amount);
    println!("   Average:       ${:.2}", stats.average_transaction);
    println!(
        "   Top category:  {}",
        stats.top_category.as_deref().unwrap_or("N/A")
    );
    println!("   Trend:         {}", stats.spending_trend);
    println!("   Risk level:    {}", stats.risk_level);
    println!();
    println!("   {:25} │ {:>10} │ {:>6}", "Category", "Amount", "%");
    println!("   ──────────────────────────┼────────────┼────────");

    let mut categories: Vec<(&String, &f64)> = stats.category_breakdown.iter().collect();
    categories.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (category, amount) in categories {
        let share = if stats.total_amount != 0.0 {
            amount / stats.total_amount * 100.0
        } else {
            0.0
        };
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}%",
            truncate(category, 25),
            amount,
            share
        );
    }

    Ok(())
}

/// One-line note describing where output came from
pub fn source_note<T>(outcome: &Outcome<T>) -> String {
    match outcome.reason() {
        None => "✨ Generated by AI".to_string(),
        Some(FallbackReason::ProviderUnavailable) => {
            "ℹ️  AI not configured, showing basic statistics".to_string()
        }
        Some(FallbackReason::ProviderCallFailure(e)) => {
            format!("⚠️  AI request failed ({}), showing basic statistics", e)
        }
        Some(FallbackReason::ParseFailure(_)) => {
            "⚠️  AI response was not valid JSON, showing basic statistics".to_string()
        }
    }
}

pub async fn cmd_analyze(data: &Path) -> Result<()> {
    let expenses = load_expenses(data)?;
    if expenses.is_empty() {
        println!("No expenses in {}", data.display());
        return Ok(());
    }

    let analyzer = ExpenseAnalyzer::from_env();
    let outcome = analyzer.analyze_expenses(&expenses).await;

    println!();
    println!("{}", source_note(&outcome));
    println!();
    println!("{}", outcome.into_inner());

    Ok(())
}

pub async fn cmd_insights(data: &Path, json: bool) -> Result<()> {
    let expenses = load_expenses(data)?;
    if expenses.is_empty() {
        println!("No expenses in {}", data.display());
        return Ok(());
    }

    let analyzer = ExpenseAnalyzer::from_env();
    let outcome = analyzer.get_expense_insights(&expenses).await;
    let note = source_note(&outcome);
    let insights = outcome.into_inner();

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    println!();
    println!("💡 Expense Insights");
    println!("   {}", note);
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Top category:  {}",
        insights.top_category.as_deref().unwrap_or("N/A")
    );
    println!("   Total spent:   ${:.2}", insights.total_spent);
    println!("   Average:       ${:.2}", insights.average_transaction);
    println!("   Trend:         {}", insights.spending_trend);
    println!("   Risk level:    {}", insights.risk_level);
    println!();
    println!("   Tip: {}", insights.quick_tip);

    Ok(())
}

/// Parse the `--today` reference date, defaulting to the current date
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --today date format (use YYYY-MM-DD)"),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn cmd_budget(data: &Path, today: Option<&str>, json: bool) -> Result<()> {
    let today = resolve_today(today)?;
    let expenses = load_expenses(data)?;

    let Some(rec) = recommend_budget(&expenses, today) else {
        println!("No dated expenses in the 3 months before {}", today);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rec)?);
        return Ok(());
    }

    println!();
    println!("💰 Budget Recommendations");
    println!(
        "   Based on the last {} months (through {})",
        rec.period_months, today
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Spent ${:.2} (${:.2}/month), risk level: {}",
        rec.total_spent, rec.monthly_average, rec.risk_level
    );
    println!();
    println!(
        "   {:25} │ {:>10} │ {:>10} │ {:>10}",
        "Category", "Spent", "Per month", "Limit"
    );
    println!("   ──────────────────────────┼────────────┼────────────┼────────────");
    for cat in &rec.categories {
        println!(
            "   {:25} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
            truncate(&cat.category, 25),
            cat.spent,
            cat.monthly_average,
            cat.suggested_limit
        );
    }

    Ok(())
}

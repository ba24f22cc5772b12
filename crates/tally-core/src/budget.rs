//! Budget recommendations from recent spending
//!
//! Looks at the trailing three months, averages each category per month and
//! suggests a limit 10% below that average.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{RawExpenseRecord, RiskLevel};
use crate::stats::{compute_basic_stats, round_cents};

/// Months of history the recommendation is based on
pub const BUDGET_PERIOD_MONTHS: u32 = 3;

/// Fraction of the monthly average suggested as the new limit
pub const SUGGESTED_LIMIT_FACTOR: f64 = 0.9;

/// Suggested limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub category: String,
    pub spent: f64,
    pub monthly_average: f64,
    pub suggested_limit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecommendation {
    pub period_months: u32,
    pub total_spent: f64,
    pub monthly_average: f64,
    pub risk_level: RiskLevel,
    pub categories: Vec<CategoryBudget>,
}

/// Recommend monthly limits from the expenses dated within the trailing
/// period ending on `today`. Both ends of the window are inclusive.
///
/// Records without a date are ignored. Returns `None` when nothing falls in
/// the window.
pub fn recommend_budget(
    expenses: &[RawExpenseRecord],
    today: NaiveDate,
) -> Option<BudgetRecommendation> {
    let start = today
        .checked_sub_months(Months::new(BUDGET_PERIOD_MONTHS))
        .unwrap_or(NaiveDate::MIN);

    let in_window: Vec<RawExpenseRecord> = expenses
        .iter()
        .filter(|e| {
            e.created_at
                .or(e.date)
                .map(|d| {
                    let day = d.date_naive();
                    day >= start && day <= today
                })
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    if in_window.is_empty() {
        return None;
    }

    let stats = compute_basic_stats(Some(&in_window));
    let months = BUDGET_PERIOD_MONTHS as f64;

    let mut categories: Vec<CategoryBudget> = stats
        .category_breakdown
        .iter()
        .map(|(category, &spent)| {
            let monthly_average = round_cents(spent / months);
            CategoryBudget {
                category: category.clone(),
                spent: round_cents(spent),
                monthly_average,
                suggested_limit: round_cents(monthly_average * SUGGESTED_LIMIT_FACTOR),
            }
        })
        .collect();

    categories.sort_by(|a, b| {
        b.spent
            .partial_cmp(&a.spent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    Some(BudgetRecommendation {
        period_months: BUDGET_PERIOD_MONTHS,
        total_spent: round_cents(stats.total_amount),
        monthly_average: round_cents(stats.total_amount / months),
        risk_level: stats.risk_level,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn on(y: i32, m: u32, d: u32, desc: &str, amount: f64, cat: &str) -> RawExpenseRecord {
        RawExpenseRecord::new(desc, amount)
            .with_category(cat)
            .with_created_at(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_empty_window() {
        assert!(recommend_budget(&[], today()).is_none());

        let old = vec![on(2023, 1, 1, "Old rent", 900.0, "housing")];
        assert!(recommend_budget(&old, today()).is_none());
    }

    #[test]
    fn test_undated_records_excluded() {
        let expenses = vec![
            RawExpenseRecord::new("No date", 500.0).with_category("misc"),
            on(2024, 6, 1, "Groceries", 90.0, "food"),
        ];
        let rec = recommend_budget(&expenses, today()).unwrap();
        assert_eq!(rec.categories.len(), 1);
        assert_eq!(rec.total_spent, 90.0);
    }

    #[test]
    fn test_window_bounds() {
        let expenses = vec![
            on(2024, 3, 14, "Too old", 500.0, "food"),
            on(2024, 3, 15, "Start day", 100.0, "food"),
            on(2024, 3, 16, "Inside", 30.0, "food"),
            on(2024, 6, 15, "Today", 5.0, "food"),
            on(2024, 6, 16, "Future", 1000.0, "food"),
        ];
        let rec = recommend_budget(&expenses, today()).unwrap();
        assert_eq!(rec.total_spent, 135.0);
    }

    #[test]
    fn test_limits_and_ordering() {
        let expenses = vec![
            on(2024, 4, 1, "Rent", 900.0, "housing"),
            on(2024, 5, 1, "Rent", 900.0, "housing"),
            on(2024, 6, 1, "Rent", 900.0, "housing"),
            on(2024, 5, 10, "Groceries", 150.0, "food"),
            on(2024, 6, 10, "Bus", 150.0, "transport"),
            on(2024, 6, 11, "Train", 100.0, "transport"),
            on(2024, 6, 12, "Dinner", 100.0, "food"),
        ];
        let rec = recommend_budget(&expenses, today()).unwrap();

        assert_eq!(rec.period_months, 3);
        assert_eq!(rec.total_spent, 3200.0);
        assert_eq!(rec.monthly_average, 1066.67);
        assert_eq!(rec.risk_level, RiskLevel::High);

        let names: Vec<&str> = rec.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["housing", "food", "transport"]);

        let housing = &rec.categories[0];
        assert_eq!(housing.spent, 2700.0);
        assert_eq!(housing.monthly_average, 900.0);
        assert_eq!(housing.suggested_limit, 810.0);

        let food = &rec.categories[1];
        assert_eq!(food.monthly_average, 83.33);
        assert_eq!(food.suggested_limit, 75.0);
    }

    #[test]
    fn test_falls_back_to_date_field() {
        let record = RawExpenseRecord::new("Gift", 60.0)
            .with_category("gifts")
            .with_date(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let rec = recommend_budget(&[record], today()).unwrap();
        assert_eq!(rec.categories[0].category, "gifts");
    }
}

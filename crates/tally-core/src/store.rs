//! Expense storage
//!
//! The HTTP layer and CLI read expenses through [`ExpenseStore`]. The only
//! implementation is [`InMemoryStore`], which can be seeded from a JSON file
//! of raw expense records.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{
    CategoryTotal, Expense, ExpenseSummary, ExpenseUpdate, NewExpense, RawExpenseRecord,
};
use crate::stats::{coerce_amount, round_cents, DEFAULT_CATEGORY};

/// Sort order on `created_at`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(Error::InvalidData(format!(
                "Invalid sort order '{}', expected asc or desc",
                s
            ))),
        }
    }
}

/// Builder for expense list queries
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub owner: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub order: SortOrder,
}

impl ExpenseFilter {
    /// Filter for all expenses of `owner`, oldest first
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    /// Only expenses created at or after `from`
    pub fn from(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self
    }

    /// Only expenses created at or before `to`
    pub fn to(mut self, to: Option<DateTime<Utc>>) -> Self {
        self.to = to;
        self
    }

    /// Only expenses in `category` (case-insensitive)
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    fn matches(&self, expense: &Expense) -> bool {
        if expense.owner != self.owner {
            return false;
        }
        if self.from.is_some_and(|from| expense.created_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| expense.created_at > to) {
            return false;
        }
        match &self.category {
            Some(wanted) => expense
                .category
                .as_deref()
                .unwrap_or(DEFAULT_CATEGORY)
                .eq_ignore_ascii_case(wanted),
            None => true,
        }
    }
}

/// Collection-style expense storage, scoped by owner
pub trait ExpenseStore: Send + Sync {
    fn create(&self, owner: &str, new: NewExpense) -> Result<Expense>;

    /// `None` when the id does not exist or belongs to another owner
    fn get(&self, owner: &str, id: i64) -> Result<Option<Expense>>;

    fn update(&self, owner: &str, id: i64, update: ExpenseUpdate) -> Result<Option<Expense>>;

    /// Returns whether an expense was removed
    fn delete(&self, owner: &str, id: i64) -> Result<bool>;

    fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>>;
}

#[derive(Debug, Default)]
struct Inner {
    expenses: Vec<Expense>,
    next_id: i64,
}

/// Expense store held in memory for the life of the process
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store for `owner` from raw records
    ///
    /// Records go through the same amount coercion as the stats engine.
    /// Records without a timestamp are stamped with the current time, and
    /// records without a description are skipped.
    pub fn from_records(owner: &str, records: &[RawExpenseRecord]) -> Result<Self> {
        let store = Self::new();
        for (index, record) in records.iter().enumerate() {
            if record.description.trim().is_empty() {
                warn!(index, "Skipping expense without a description");
                continue;
            }
            store.create(
                owner,
                NewExpense {
                    description: record.description.clone(),
                    amount: coerce_amount(&record.amount),
                    category: record.category.clone().filter(|c| !c.is_empty()),
                    created_at: record.created_at.or(record.date),
                },
            )?;
        }
        Ok(store)
    }

    /// Seed a store for `owner` from a JSON file holding an array of records
    pub fn from_json_file(owner: &str, path: &Path) -> Result<Self> {
        let records = load_records(path)?;
        info!(count = records.len(), path = %path.display(), "Loaded expenses");
        Self::from_records(owner, &records)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::InvalidData("Expense store lock poisoned".to_string()))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| Error::InvalidData("Expense store lock poisoned".to_string()))
    }
}

fn validate(description: &str, amount: f64) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::InvalidData("Description is required".to_string()));
    }
    if !amount.is_finite() {
        return Err(Error::InvalidData("Amount must be a finite number".to_string()));
    }
    Ok(())
}

impl ExpenseStore for InMemoryStore {
    fn create(&self, owner: &str, new: NewExpense) -> Result<Expense> {
        validate(&new.description, new.amount)?;

        let mut inner = self.write()?;
        inner.next_id += 1;
        let expense = Expense {
            id: inner.next_id,
            owner: owner.to_string(),
            description: new.description.trim().to_string(),
            amount: new.amount,
            category: new.category,
            created_at: new.created_at.unwrap_or_else(Utc::now),
        };
        inner.expenses.push(expense.clone());
        debug!(id = expense.id, owner, "Created expense");
        Ok(expense)
    }

    fn get(&self, owner: &str, id: i64) -> Result<Option<Expense>> {
        let inner = self.read()?;
        Ok(inner
            .expenses
            .iter()
            .find(|e| e.id == id && e.owner == owner)
            .cloned())
    }

    fn update(&self, owner: &str, id: i64, update: ExpenseUpdate) -> Result<Option<Expense>> {
        let mut inner = self.write()?;
        let Some(expense) = inner
            .expenses
            .iter_mut()
            .find(|e| e.id == id && e.owner == owner)
        else {
            return Ok(None);
        };

        let description = update
            .description
            .unwrap_or_else(|| expense.description.clone());
        let amount = update.amount.unwrap_or(expense.amount);
        validate(&description, amount)?;

        expense.description = description.trim().to_string();
        expense.amount = amount;
        if let Some(category) = update.category {
            expense.category = Some(category).filter(|c| !c.is_empty());
        }
        if let Some(created_at) = update.created_at {
            expense.created_at = created_at;
        }
        Ok(Some(expense.clone()))
    }

    fn delete(&self, owner: &str, id: i64) -> Result<bool> {
        let mut inner = self.write()?;
        let before = inner.expenses.len();
        inner.expenses.retain(|e| !(e.id == id && e.owner == owner));
        Ok(inner.expenses.len() < before)
    }

    fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let inner = self.read()?;
        let mut expenses: Vec<Expense> = inner
            .expenses
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        // Stable sort keeps insertion order for equal timestamps
        expenses.sort_by_key(|e| e.created_at);
        if filter.order == SortOrder::Desc {
            expenses.reverse();
        }
        Ok(expenses)
    }
}

/// Read a JSON array of raw expense records
pub fn load_records(path: &Path) -> Result<Vec<RawExpenseRecord>> {
    let content = fs::read_to_string(path)?;
    let records: Vec<RawExpenseRecord> = serde_json::from_str(&content).map_err(|e| {
        Error::InvalidData(format!(
            "{} is not a JSON array of expenses: {}",
            path.display(),
            e
        ))
    })?;
    Ok(records)
}

/// Totals per category for a set of expenses
///
/// Categories are ordered by amount descending, ties by name.
pub fn summarize(
    expenses: &[Expense],
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> ExpenseSummary {
    let total: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut categories: Vec<CategoryTotal> = Vec::new();
    for expense in expenses {
        let name = expense
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        match categories.iter_mut().find(|c| c.category == name) {
            Some(entry) => {
                entry.amount += expense.amount;
                entry.count += 1;
            }
            None => categories.push(CategoryTotal {
                category: name.to_string(),
                amount: expense.amount,
                count: 1,
                percentage: 0.0,
            }),
        }
    }

    for entry in &mut categories {
        entry.percentage = if total != 0.0 {
            round_cents(entry.amount / total * 100.0)
        } else {
            0.0
        };
        entry.amount = round_cents(entry.amount);
    }

    categories.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    ExpenseSummary {
        total_amount: round_cents(total),
        count: expenses.len(),
        categories,
        from,
        to,
    }
}

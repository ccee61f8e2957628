//! Income allocation across categories.
//!
//! Everything here is pure: the engine loads categories and records from the
//! database and delegates the math to these functions.

use chrono::{DateTime, Utc};

use crate::{Category, MoneyCents, MonthlyRecord, ResultEngine};

/// Tolerance used when checking that percentages add up to 100.
const BALANCE_EPSILON: f64 = 0.001;

/// The share of an income assigned to one category.
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub category_name: String,
    pub percentage: f64,
    pub color: String,
    pub icon: String,
    pub amount: MoneyCents,
}

/// Active categories in display order (`display_order`, then `id`).
pub fn active_in_order(categories: &[Category]) -> Vec<&Category> {
    let mut active: Vec<&Category> = categories.iter().filter(|c| c.active).collect();
    active.sort_by_key(|c| (c.display_order, c.id));
    active
}

/// Splits `income` across the active categories.
///
/// Each amount is `income * percentage / 100` rounded to the cent, half away
/// from zero. Amounts are computed independently, so their sum equals the
/// income only when the percentages add up to 100.
pub fn allocate(income: MoneyCents, categories: &[Category]) -> Vec<Allocation> {
    active_in_order(categories)
        .into_iter()
        .map(|category| Allocation {
            category_name: category.name.clone(),
            percentage: category.percentage,
            color: category.color.clone(),
            icon: category.icon.clone(),
            amount: income.percent(category.percentage),
        })
        .collect()
}

/// Sum of the active categories' percentages.
pub fn total_percentage(categories: &[Category]) -> f64 {
    categories
        .iter()
        .filter(|c| c.active)
        .map(|c| c.percentage)
        .sum()
}

/// `true` when the active percentages add up to 100.
pub fn is_balanced(categories: &[Category]) -> bool {
    (total_percentage(categories) - 100.0).abs() < BALANCE_EPSILON
}

/// Latest creation/update instant across all categories.
pub fn latest_category_change(categories: &[Category]) -> Option<DateTime<Utc>> {
    categories.iter().map(Category::last_modified).max()
}

/// A record is stale when a category changed after its last sync.
pub fn is_stale(synced_at: DateTime<Utc>, latest_change: Option<DateTime<Utc>>) -> bool {
    latest_change.is_some_and(|changed| changed > synced_at)
}

/// Aggregates over the registered incomes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IncomeStats {
    pub months: usize,
    pub total: MoneyCents,
    /// Monthly average rounded to the cent.
    pub average: MoneyCents,
    pub best: MoneyCents,
}

impl IncomeStats {
    pub fn from_records(records: &[MonthlyRecord]) -> ResultEngine<Self> {
        if records.is_empty() {
            return Ok(Self::default());
        }
        let total = MoneyCents::try_sum(records.iter().map(|r| r.income))?;
        let best = records
            .iter()
            .map(|r| r.income)
            .max()
            .unwrap_or(MoneyCents::ZERO);
        let average = MoneyCents::new((total.cents() as f64 / records.len() as f64).round() as i64);
        Ok(Self {
            months: records.len(),
            total,
            average,
            best,
        })
    }
}

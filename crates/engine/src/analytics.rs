//! Budget analytics.
//!
//! Every function here is pure: it works on a user and that user's
//! transaction list as fetched once by the caller. Only entries with a
//! positive amount count as spend.

use std::{collections::HashMap, fmt};

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::{Category, Transaction, User};

/// Share of the budget below which a "near limit" warning fires.
pub const NEAR_LIMIT_RATIO: f64 = 0.10;

/// Length of the weekly window, in days.
pub const WEEK_DAYS: u64 = 7;

pub fn total_spent(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.is_spend())
        .map(|tx| tx.amount)
        .sum()
}

/// Budget minus spend. Negative when over budget.
pub fn remaining(user: &User, transactions: &[Transaction]) -> f64 {
    user.budget - total_spent(transactions)
}

pub fn is_over_budget(remaining: f64) -> bool {
    remaining < 0.0
}

pub fn category_breakdown(transactions: &[Transaction]) -> HashMap<Category, f64> {
    let mut breakdown: HashMap<Category, f64> = HashMap::new();
    for tx in transactions.iter().filter(|tx| tx.is_spend()) {
        *breakdown.entry(tx.category).or_insert(0.0) += tx.amount;
    }
    breakdown
}

/// Breakdown ordered by descending sum; ties fall back to the category name.
pub fn sorted_breakdown(breakdown: &HashMap<Category, f64>) -> Vec<(Category, f64)> {
    let mut rows: Vec<(Category, f64)> = breakdown
        .iter()
        .map(|(category, total)| (*category, *total))
        .collect();
    rows.sort_by(|(a_category, a_total), (b_category, b_total)| {
        b_total
            .total_cmp(a_total)
            .then_with(|| a_category.as_str().cmp(b_category.as_str()))
    });
    rows
}

/// At most one warning: over budget wins over near limit.
pub fn warnings(user: &User, transactions: &[Transaction]) -> Vec<String> {
    budget_warning(user.budget, remaining(user, transactions))
        .into_iter()
        .collect()
}

fn budget_warning(budget: f64, remaining: f64) -> Option<String> {
    if is_over_budget(remaining) {
        Some(format!(
            "OVER BUDGET: spending exceeds the budget by {:.2}",
            -remaining
        ))
    } else if remaining < NEAR_LIMIT_RATIO * budget {
        Some(format!(
            "Warning: near the budget limit, only {remaining:.2} remaining"
        ))
    } else {
        None
    }
}

/// First day included in the weekly window.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(WEEK_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// Entries created in the last seven days, newest first.
pub fn weekly_window(transactions: &[Transaction], today: NaiveDate) -> Vec<Transaction> {
    let since = week_start(today);
    let mut window: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| tx.created_date.is_some_and(|date| date >= since))
        .cloned()
        .collect();
    window.sort_by(|a, b| {
        b.created_date
            .cmp(&a.created_date)
            .then_with(|| b.created_time.cmp(&a.created_time))
    });
    window
}

pub fn total_last_7_days(transactions: &[Transaction], today: NaiveDate) -> f64 {
    total_spent(&weekly_window(transactions, today))
}

fn in_month(tx: &Transaction, today: NaiveDate) -> bool {
    tx.created_date
        .is_some_and(|date| date.year() == today.year() && date.month() == today.month())
}

pub fn monthly_summary(user: &User, transactions: &[Transaction], today: NaiveDate) -> MonthlySummary {
    let month: Vec<Transaction> = transactions
        .iter()
        .filter(|tx| in_month(tx, today))
        .cloned()
        .collect();
    let spent = total_spent(&month);
    MonthlySummary {
        username: user.username.clone(),
        year: today.year(),
        month: today.month(),
        budget: user.budget,
        spent,
        remaining: user.budget - spent,
        breakdown: category_breakdown(&month),
    }
}

pub fn weekly_summary(user: &User, transactions: &[Transaction], today: NaiveDate) -> WeeklySummary {
    let window = weekly_window(transactions, today);
    WeeklySummary {
        username: user.username.clone(),
        since: week_start(today),
        total: total_spent(&window),
        transactions: window,
    }
}

/// Spend of one calendar month. `Display` renders the text report.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub username: String,
    pub year: i32,
    pub month: u32,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub breakdown: HashMap<Category, f64>,
}

impl fmt::Display for MonthlySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Monthly summary for {} ({}-{:02})",
            self.username, self.year, self.month
        )?;
        writeln!(f, "Budget: {:.2}", self.budget)?;
        writeln!(f, "Spent: {:.2}", self.spent)?;
        writeln!(f, "Remaining: {:.2}", self.remaining)?;
        write!(f, "Spending by category:")?;
        let rows = sorted_breakdown(&self.breakdown);
        if rows.is_empty() {
            write!(f, "\n  (no spending)")?;
        }
        for (category, total) in rows {
            write!(f, "\n  {category}: {total:.2}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    pub username: String,
    pub since: NaiveDate,
    pub total: f64,
    pub transactions: Vec<Transaction>,
}

impl fmt::Display for WeeklySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spending for {} since {}", self.username, self.since)?;
        write!(f, "Total: {:.2}", self.total)?;
        for tx in &self.transactions {
            let date = tx
                .created_date
                .map(|date| date.to_string())
                .unwrap_or_default();
            write!(
                f,
                "\n  {date}  {:<14} {:>10.2}  {}",
                tx.category.as_str(),
                tx.amount,
                tx.description
            )?;
        }
        Ok(())
    }
}

//! Report shapes handed to the presentation layer.

use std::collections::HashMap;

use serde::Serialize;

use crate::{Category, Transaction, User, analytics};

/// Structured aggregate of one user's budget health.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub user: User,
    pub transactions: Vec<Transaction>,
    pub total_spent: f64,
    pub remaining: f64,
    pub category_breakdown: HashMap<Category, f64>,
    pub is_over_budget: bool,
    pub warnings: Vec<String>,
}

impl BudgetReport {
    pub fn compile(user: User, transactions: Vec<Transaction>) -> Self {
        let total_spent = analytics::total_spent(&transactions);
        let remaining = user.budget - total_spent;
        Self {
            category_breakdown: analytics::category_breakdown(&transactions),
            is_over_budget: analytics::is_over_budget(remaining),
            warnings: analytics::warnings(&user, &transactions),
            total_spent,
            remaining,
            user,
            transactions,
        }
    }
}

/// Result of a text-summary path.
///
/// A missing user is reported as an `Error` entry instead of a failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SummaryEntry {
    Summary(String),
    Error(String),
}

impl SummaryEntry {
    pub fn text(&self) -> &str {
        match self {
            Self::Summary(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

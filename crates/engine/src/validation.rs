//! Field validation applied before any write reaches the gateway.
//!
//! Inputs keep the loose typing of the request body (`amount` and `budget`
//! are raw JSON values) so type errors can be reported as such. Every check
//! here is pure.
//!
//! Patch fields distinguish an absent key (`None`) from a key sent as
//! `null` (`Some(None)` for strings, `Some(Value::Null)` for numbers); the
//! latter is validated like any other supplied value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, Transaction, User};

/// Candidate for `Engine::create_transaction`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub user_id: Option<Uuid>,
    pub description: Option<String>,
    pub amount: Option<Value>,
    pub category: Option<String>,
}

impl TransactionDraft {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            description: Some(description.into()),
            amount: Some(Value::from(amount)),
            category: Some(category.into()),
        }
    }
}

/// Wraps whatever the key holds, `null` included, so presence survives
/// deserialisation. Absent keys fall back to `None` through `default`.
fn supplied<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial update of a transaction. Absent keys keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
}

impl TransactionPatch {
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: impl Into<Value>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(Some(category.into()));
        self
    }
}

/// Budget update; a patch without `budget` is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetPatch {
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub budget: Option<Value>,
}

impl BudgetPatch {
    #[must_use]
    pub fn new(budget: impl Into<Value>) -> Self {
        Self {
            budget: Some(budget.into()),
        }
    }
}

/// Partial update of a user, applied in place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub username: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied", skip_serializing_if = "Option::is_none")]
    pub budget: Option<Value>,
}

impl UserPatch {
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(Some(username.into()));
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(Some(email.into()));
        self
    }

    #[must_use]
    pub fn budget(mut self, budget: impl Into<Value>) -> Self {
        self.budget = Some(budget.into());
        self
    }
}

/// A draft that passed every check.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidTransaction {
    pub user_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: Category,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<Category>,
}

impl ValidPatch {
    /// Returns a copy of `existing` with the supplied fields replaced.
    pub fn apply_to(&self, existing: &Transaction) -> Transaction {
        let mut updated = existing.clone();
        if let Some(description) = &self.description {
            updated.description = description.clone();
        }
        if let Some(amount) = self.amount {
            updated.amount = amount;
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        updated
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidUserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub budget: Option<f64>,
}

impl ValidUserPatch {
    pub fn apply_to(&self, existing: &User) -> User {
        let mut updated = existing.clone();
        if let Some(username) = &self.username {
            updated.username = username.clone();
        }
        if let Some(email) = &self.email {
            updated.email = email.clone();
        }
        if let Some(budget) = self.budget {
            updated.budget = budget;
        }
        updated
    }
}

pub fn validate_draft(draft: &TransactionDraft) -> ResultEngine<ValidTransaction> {
    let user_id = draft.user_id.ok_or(EngineError::MissingUserId)?;
    let description = draft
        .description
        .as_deref()
        .ok_or(EngineError::MissingDescription)
        .and_then(validate_description)?;
    let amount = draft
        .amount
        .as_ref()
        .ok_or(EngineError::InvalidAmountType)
        .and_then(parse_amount)?;
    let category = draft
        .category
        .as_deref()
        .ok_or(EngineError::MissingCategory)
        .and_then(validate_category)?;

    Ok(ValidTransaction {
        user_id,
        description,
        amount,
        category,
    })
}

/// Validates each supplied key independently.
pub fn validate_patch(patch: &TransactionPatch) -> ResultEngine<ValidPatch> {
    let valid = ValidPatch {
        description: patch
            .description
            .as_ref()
            .map(|description| {
                description
                    .as_deref()
                    .ok_or(EngineError::MissingDescription)
                    .and_then(validate_description)
            })
            .transpose()?,
        amount: patch.amount.as_ref().map(parse_amount).transpose()?,
        category: patch
            .category
            .as_ref()
            .map(|category| {
                category
                    .as_deref()
                    .ok_or(EngineError::MissingCategory)
                    .and_then(validate_category)
            })
            .transpose()?,
    };
    if valid == ValidPatch::default() {
        return Err(EngineError::NoValidFields);
    }
    Ok(valid)
}

pub fn validate_user_patch(patch: &UserPatch) -> ResultEngine<ValidUserPatch> {
    let valid = ValidUserPatch {
        username: patch
            .username
            .as_ref()
            .map(|username| validate_username(username.as_deref().unwrap_or_default()))
            .transpose()?,
        email: patch
            .email
            .as_ref()
            .map(|email| validate_email(email.as_deref().unwrap_or_default()))
            .transpose()?,
        budget: patch.budget.as_ref().map(parse_budget).transpose()?,
    };
    if valid == ValidUserPatch::default() {
        return Err(EngineError::NoValidFields);
    }
    Ok(valid)
}

pub fn validate_description(value: &str) -> ResultEngine<String> {
    normalize_required(value, EngineError::BlankDescription)
}

pub fn validate_category(value: &str) -> ResultEngine<Category> {
    if value.trim().is_empty() {
        return Err(EngineError::BlankCategory);
    }
    value.parse()
}

pub fn validate_username(value: &str) -> ResultEngine<String> {
    normalize_required(value, EngineError::BlankUsername)
}

pub fn validate_email(value: &str) -> ResultEngine<String> {
    normalize_required(value, EngineError::BlankEmail)
}

/// Amounts must be JSON numbers strictly greater than zero.
pub fn parse_amount(value: &Value) -> ResultEngine<f64> {
    let amount = value
        .as_f64()
        .filter(|amount| amount.is_finite())
        .ok_or(EngineError::InvalidAmountType)?;
    if amount <= 0.0 {
        return Err(EngineError::AmountNotPositive);
    }
    Ok(amount)
}

/// Budgets accept a number or a numeric string, and must not be negative.
pub fn parse_budget(value: &Value) -> ResultEngine<f64> {
    let budget = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|budget| budget.is_finite())
    .ok_or(EngineError::InvalidBudgetFormat)?;
    if budget < 0.0 {
        return Err(EngineError::NegativeBudget);
    }
    Ok(budget)
}

fn normalize_required(value: &str, blank: EngineError) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(blank);
    }
    Ok(trimmed.to_string())
}

//! Persistence gateway: the read/write/aggregate primitives the engine needs
//! from a backend.
//!
//! Two backends implement [`Gateway`]:
//!
//! - [`SqlGateway`]: sea-orm over the relational schema in `migration`.
//! - [`MemoryGateway`]: process-local maps, for lower-stakes deployments and
//!   tests.
//!
//! Backends translate their native failures into [`GatewayError`], so the
//! engine never inspects driver messages.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::{InsertedTransaction, NewUser, Transaction, User, validation::ValidTransaction};

pub use memory::MemoryGateway;
pub use sql::SqlGateway;

mod memory;
mod sql;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures a backend must tell apart for the engine to translate them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// A referenced row does not exist (e.g. `user_id`).
    #[error("foreign key violation on \"{column}\"")]
    ForeignKeyViolation { column: String },
    /// A value outside the column's domain (e.g. an unknown category).
    #[error("domain violation on \"{column}\": \"{value}\"")]
    DomainViolation { column: String, value: String },
    /// A unique constraint fired; `constraint` names the column.
    #[error("unique violation on \"{constraint}\"")]
    UniqueViolation { constraint: String },
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select_users(&self) -> GatewayResult<Vec<User>>;

    async fn select_user(&self, id: Uuid) -> GatewayResult<Option<User>>;

    /// Stores the user, generating an id unless the candidate carries one.
    async fn insert_user(&self, user: &NewUser) -> GatewayResult<Uuid>;

    /// Rewrites username, email and budget in place.
    async fn update_user(&self, user: &User) -> GatewayResult<u64>;

    async fn update_user_budget(&self, id: Uuid, budget: f64) -> GatewayResult<u64>;

    /// Deletes the user and every transaction it owns.
    async fn delete_user(&self, id: Uuid) -> GatewayResult<u64>;

    /// All transactions, newest first.
    async fn select_transactions(&self) -> GatewayResult<Vec<Transaction>>;

    async fn select_transaction(&self, id: Uuid) -> GatewayResult<Option<Transaction>>;

    /// One user's transactions, newest first.
    async fn select_transactions_by_user(&self, user_id: Uuid) -> GatewayResult<Vec<Transaction>>;

    /// Stores the fields and generates `id`, `created_time` and `created_date`.
    async fn insert_transaction(
        &self,
        fields: &ValidTransaction,
    ) -> GatewayResult<InsertedTransaction>;

    /// Rewrites description, amount and category of `tx.id`.
    async fn update_transaction(&self, tx: &Transaction) -> GatewayResult<u64>;

    async fn delete_transaction(&self, id: Uuid) -> GatewayResult<u64>;

    /// Number of users with `username`, ignoring `exclude` when given.
    async fn count_by_username(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>>;

    async fn count_by_email(&self, email: &str, exclude: Option<Uuid>)
    -> GatewayResult<Option<u64>>;

    /// Sum of positive amounts created on or after `since`; `None` when no
    /// row matches.
    async fn sum_spend_since(&self, user_id: Uuid, since: NaiveDate)
    -> GatewayResult<Option<f64>>;
}

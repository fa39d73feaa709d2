//! In-process backend.
//!
//! Transactions live in a map keyed by a monotonically increasing sequence
//! number; rows are only removed by an explicit delete (or the user cascade).
//! Every read clones a snapshot under the lock.

use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Gateway, GatewayError, GatewayResult};
use crate::{InsertedTransaction, NewUser, Transaction, User, validation::ValidTransaction};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    sequence: AtomicU64,
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    transactions: BTreeMap<u64, Transaction>,
}

impl State {
    /// A taken username is reported before a taken email, whoever holds them.
    fn ensure_unique(&self, user: &User) -> GatewayResult<()> {
        let taken = |same: fn(&User, &User) -> bool| {
            self.users
                .values()
                .any(|other| other.id != user.id && same(other, user))
        };
        if taken(|a, b| a.username == b.username) {
            return Err(GatewayError::UniqueViolation {
                constraint: "username".to_string(),
            });
        }
        if taken(|a, b| a.email == b.email) {
            return Err(GatewayError::UniqueViolation {
                constraint: "email".to_string(),
            });
        }
        Ok(())
    }

    fn find_key(&self, id: Uuid) -> Option<u64> {
        self.transactions
            .iter()
            .find_map(|(key, tx)| (tx.id == id).then_some(*key))
    }

    fn count_users<F>(&self, exclude: Option<Uuid>, matches: F) -> u64
    where
        F: Fn(&User) -> bool,
    {
        self.users
            .values()
            .filter(|user| Some(user.id) != exclude)
            .filter(|user| matches(user))
            .count() as u64
    }
}

/// Newest first; entries created at the same instant keep reverse insertion
/// order.
fn newest_first<'a>(rows: impl Iterator<Item = &'a Transaction>) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = rows.cloned().collect();
    rows.reverse();
    rows.sort_by(|a, b| b.created_time.cmp(&a.created_time));
    rows
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select_users(&self) -> GatewayResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn select_user(&self, id: Uuid) -> GatewayResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> GatewayResult<Uuid> {
        let mut state = self.state.write().await;
        let id = user.id.unwrap_or_else(Uuid::new_v4);
        if state.users.contains_key(&id) {
            return Err(GatewayError::UniqueViolation {
                constraint: "id".to_string(),
            });
        }
        let user = user.clone().into_user(id);
        state.ensure_unique(&user)?;
        state.users.insert(id, user);
        Ok(id)
    }

    async fn update_user(&self, user: &User) -> GatewayResult<u64> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.id) {
            return Ok(0);
        }
        state.ensure_unique(user)?;
        state.users.insert(user.id, user.clone());
        Ok(1)
    }

    async fn update_user_budget(&self, id: Uuid, budget: f64) -> GatewayResult<u64> {
        let mut state = self.state.write().await;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.budget = budget;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_user(&self, id: Uuid) -> GatewayResult<u64> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Ok(0);
        }
        state.transactions.retain(|_, tx| tx.user_id != id);
        Ok(1)
    }

    async fn select_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(newest_first(state.transactions.values()))
    }

    async fn select_transaction(&self, id: Uuid) -> GatewayResult<Option<Transaction>> {
        let state = self.state.read().await;
        Ok(state.transactions.values().find(|tx| tx.id == id).cloned())
    }

    async fn select_transactions_by_user(&self, user_id: Uuid) -> GatewayResult<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(newest_first(
            state
                .transactions
                .values()
                .filter(|tx| tx.user_id == user_id),
        ))
    }

    async fn insert_transaction(
        &self,
        fields: &ValidTransaction,
    ) -> GatewayResult<InsertedTransaction> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&fields.user_id) {
            return Err(GatewayError::ForeignKeyViolation {
                column: "user_id".to_string(),
            });
        }

        let now = Utc::now();
        let inserted = InsertedTransaction {
            id: Uuid::new_v4(),
            created_time: Some(now),
            created_date: Some(now.date_naive()),
        };
        let key = self.sequence.fetch_add(1, Ordering::SeqCst);
        state
            .transactions
            .insert(key, inserted.with_fields(fields.clone()));
        Ok(inserted)
    }

    async fn update_transaction(&self, tx: &Transaction) -> GatewayResult<u64> {
        let mut state = self.state.write().await;
        let Some(key) = state.find_key(tx.id) else {
            return Ok(0);
        };
        if let Some(stored) = state.transactions.get_mut(&key) {
            stored.description = tx.description.clone();
            stored.amount = tx.amount;
            stored.category = tx.category;
        }
        Ok(1)
    }

    async fn delete_transaction(&self, id: Uuid) -> GatewayResult<u64> {
        let mut state = self.state.write().await;
        let removed = state
            .find_key(id)
            .and_then(|key| state.transactions.remove(&key));
        Ok(u64::from(removed.is_some()))
    }

    async fn count_by_username(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        let state = self.state.read().await;
        Ok(Some(
            state.count_users(exclude, |user| user.username == username),
        ))
    }

    async fn count_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        let state = self.state.read().await;
        Ok(Some(state.count_users(exclude, |user| user.email == email)))
    }

    async fn sum_spend_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> GatewayResult<Option<f64>> {
        let state = self.state.read().await;
        let amounts: Vec<f64> = state
            .transactions
            .values()
            .filter(|tx| tx.user_id == user_id && tx.is_spend())
            .filter(|tx| tx.created_date.is_some_and(|date| date >= since))
            .map(|tx| tx.amount)
            .collect();
        if amounts.is_empty() {
            return Ok(None);
        }
        Ok(Some(amounts.into_iter().sum()))
    }
}

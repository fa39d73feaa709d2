#![allow(dead_code)]

use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Engine, Gateway, GatewayError, GatewayResult, InsertedTransaction, MemoryGateway, NewUser,
    Transaction, User, validation::ValidTransaction,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build();
    (engine, db)
}

pub fn engine_in_memory() -> Engine {
    Engine::builder().build()
}

pub async fn alice(engine: &Engine, budget: f64) -> User {
    engine
        .add_user(NewUser::new("alice", "alice@example.com", budget))
        .await
        .unwrap()
}

pub async fn bob(engine: &Engine, budget: f64) -> User {
    engine
        .add_user(NewUser::new("bob", "bob@example.com", budget))
        .await
        .unwrap()
}

/// Memory backend that counts the writes reaching it.
#[derive(Default)]
pub struct RecordingGateway {
    inner: MemoryGateway,
    inserts: AtomicUsize,
}

impl RecordingGateway {
    pub fn engine() -> (Engine, Arc<RecordingGateway>) {
        let gateway = Arc::new(RecordingGateway::default());
        let engine = Engine::builder().gateway(gateway.clone()).build();
        (engine, gateway)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn select_users(&self) -> GatewayResult<Vec<User>> {
        self.inner.select_users().await
    }

    async fn select_user(&self, id: Uuid) -> GatewayResult<Option<User>> {
        self.inner.select_user(id).await
    }

    async fn insert_user(&self, user: &NewUser) -> GatewayResult<Uuid> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&self, user: &User) -> GatewayResult<u64> {
        self.inner.update_user(user).await
    }

    async fn update_user_budget(&self, id: Uuid, budget: f64) -> GatewayResult<u64> {
        self.inner.update_user_budget(id, budget).await
    }

    async fn delete_user(&self, id: Uuid) -> GatewayResult<u64> {
        self.inner.delete_user(id).await
    }

    async fn select_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        self.inner.select_transactions().await
    }

    async fn select_transaction(&self, id: Uuid) -> GatewayResult<Option<Transaction>> {
        self.inner.select_transaction(id).await
    }

    async fn select_transactions_by_user(&self, user_id: Uuid) -> GatewayResult<Vec<Transaction>> {
        self.inner.select_transactions_by_user(user_id).await
    }

    async fn insert_transaction(
        &self,
        fields: &ValidTransaction,
    ) -> GatewayResult<InsertedTransaction> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_transaction(fields).await
    }

    async fn update_transaction(&self, tx: &Transaction) -> GatewayResult<u64> {
        self.inner.update_transaction(tx).await
    }

    async fn delete_transaction(&self, id: Uuid) -> GatewayResult<u64> {
        self.inner.delete_transaction(id).await
    }

    async fn count_by_username(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        self.inner.count_by_username(username, exclude).await
    }

    async fn count_by_email(&self, email: &str, exclude: Option<Uuid>) -> GatewayResult<Option<u64>> {
        self.inner.count_by_email(email, exclude).await
    }

    async fn sum_spend_since(&self, user_id: Uuid, since: NaiveDate) -> GatewayResult<Option<f64>> {
        self.inner.sum_spend_since(user_id, since).await
    }
}

/// Memory backend that stores writes but does not report them: the first
/// read of a new transaction comes back empty and every update touches no
/// rows.
#[derive(Default)]
pub struct StaleGateway {
    inner: MemoryGateway,
    unechoed: Mutex<HashSet<Uuid>>,
}

impl StaleGateway {
    pub fn engine() -> Engine {
        Engine::builder()
            .gateway(Arc::new(StaleGateway::default()))
            .build()
    }
}

#[async_trait]
impl Gateway for StaleGateway {
    async fn select_users(&self) -> GatewayResult<Vec<User>> {
        self.inner.select_users().await
    }

    async fn select_user(&self, id: Uuid) -> GatewayResult<Option<User>> {
        self.inner.select_user(id).await
    }

    async fn insert_user(&self, user: &NewUser) -> GatewayResult<Uuid> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&self, _user: &User) -> GatewayResult<u64> {
        Ok(0)
    }

    async fn update_user_budget(&self, _id: Uuid, _budget: f64) -> GatewayResult<u64> {
        Ok(0)
    }

    async fn delete_user(&self, id: Uuid) -> GatewayResult<u64> {
        self.inner.delete_user(id).await
    }

    async fn select_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        self.inner.select_transactions().await
    }

    async fn select_transaction(&self, id: Uuid) -> GatewayResult<Option<Transaction>> {
        if self.unechoed.lock().unwrap().remove(&id) {
            return Ok(None);
        }
        self.inner.select_transaction(id).await
    }

    async fn select_transactions_by_user(&self, user_id: Uuid) -> GatewayResult<Vec<Transaction>> {
        self.inner.select_transactions_by_user(user_id).await
    }

    async fn insert_transaction(
        &self,
        fields: &ValidTransaction,
    ) -> GatewayResult<InsertedTransaction> {
        let inserted = self.inner.insert_transaction(fields).await?;
        self.unechoed.lock().unwrap().insert(inserted.id);
        Ok(inserted)
    }

    async fn update_transaction(&self, _tx: &Transaction) -> GatewayResult<u64> {
        Ok(0)
    }

    async fn delete_transaction(&self, id: Uuid) -> GatewayResult<u64> {
        self.inner.delete_transaction(id).await
    }

    async fn count_by_username(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        self.inner.count_by_username(username, exclude).await
    }

    async fn count_by_email(&self, email: &str, exclude: Option<Uuid>) -> GatewayResult<Option<u64>> {
        self.inner.count_by_email(email, exclude).await
    }

    async fn sum_spend_since(&self, user_id: Uuid, since: NaiveDate) -> GatewayResult<Option<f64>> {
        self.inner.sum_spend_since(user_id, since).await
    }
}

/// Backend whose every call fails.
pub struct OfflineGateway;

fn offline<T>() -> GatewayResult<T> {
    Err(GatewayError::Other("database is locked".to_string()))
}

#[async_trait]
impl Gateway for OfflineGateway {
    async fn select_users(&self) -> GatewayResult<Vec<User>> {
        offline()
    }

    async fn select_user(&self, _id: Uuid) -> GatewayResult<Option<User>> {
        offline()
    }

    async fn insert_user(&self, _user: &NewUser) -> GatewayResult<Uuid> {
        offline()
    }

    async fn update_user(&self, _user: &User) -> GatewayResult<u64> {
        offline()
    }

    async fn update_user_budget(&self, _id: Uuid, _budget: f64) -> GatewayResult<u64> {
        offline()
    }

    async fn delete_user(&self, _id: Uuid) -> GatewayResult<u64> {
        offline()
    }

    async fn select_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        offline()
    }

    async fn select_transaction(&self, _id: Uuid) -> GatewayResult<Option<Transaction>> {
        offline()
    }

    async fn select_transactions_by_user(&self, _user_id: Uuid) -> GatewayResult<Vec<Transaction>> {
        offline()
    }

    async fn insert_transaction(
        &self,
        _fields: &ValidTransaction,
    ) -> GatewayResult<InsertedTransaction> {
        offline()
    }

    async fn update_transaction(&self, _tx: &Transaction) -> GatewayResult<u64> {
        offline()
    }

    async fn delete_transaction(&self, _id: Uuid) -> GatewayResult<u64> {
        offline()
    }

    async fn count_by_username(
        &self,
        _username: &str,
        _exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        offline()
    }

    async fn count_by_email(
        &self,
        _email: &str,
        _exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        offline()
    }

    async fn sum_spend_since(
        &self,
        _user_id: Uuid,
        _since: NaiveDate,
    ) -> GatewayResult<Option<f64>> {
        offline()
    }
}

pub fn offline_engine() -> Engine {
    Engine::builder().gateway(Arc::new(OfflineGateway)).build()
}

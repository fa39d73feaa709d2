//! Relational backend built on sea-orm.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use super::{Gateway, GatewayError, GatewayResult};
use crate::{
    InsertedTransaction, NewUser, Transaction, User, transactions, users,
    validation::ValidTransaction,
};

#[derive(Clone, Debug)]
pub struct SqlGateway {
    database: DatabaseConnection,
}

impl SqlGateway {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

/// Classifies a sea-orm failure.
///
/// Unique and foreign-key violations come from `DbErr::sql_err`; sqlite has
/// no structured code for `CHECK`, so that one is read from the message.
fn map_db_err(err: DbErr) -> GatewayError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => GatewayError::UniqueViolation {
            constraint: unique_constraint(&message),
        },
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => GatewayError::ForeignKeyViolation {
            column: "user_id".to_string(),
        },
        _ => {
            let message = err.to_string();
            if message.contains("CHECK constraint failed") {
                GatewayError::DomainViolation {
                    column: "category".to_string(),
                    value: String::new(),
                }
            } else {
                GatewayError::Other(message)
            }
        }
    }
}

/// Extracts the column from "UNIQUE constraint failed: users.email".
fn unique_constraint(message: &str) -> String {
    message
        .rsplit_once("users.")
        .map(|(_, column)| column.trim().to_string())
        .unwrap_or_else(|| message.to_string())
}

fn rows_to_transactions(models: Vec<transactions::Model>) -> GatewayResult<Vec<Transaction>> {
    models.into_iter().map(Transaction::try_from).collect()
}

#[async_trait]
impl Gateway for SqlGateway {
    async fn select_users(&self) -> GatewayResult<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(models.into_iter().map(User::from).collect())
    }

    async fn select_user(&self, id: Uuid) -> GatewayResult<Option<User>> {
        let model = users::Entity::find_by_id(id)
            .one(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(model.map(User::from))
    }

    async fn insert_user(&self, user: &NewUser) -> GatewayResult<Uuid> {
        let id = user.id.unwrap_or_else(Uuid::new_v4);
        let user = user.clone().into_user(id);
        users::Entity::insert(users::ActiveModel::from(&user))
            .exec(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(id)
    }

    async fn update_user(&self, user: &User) -> GatewayResult<u64> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Username, Expr::value(user.username.clone()))
            .col_expr(users::Column::Email, Expr::value(user.email.clone()))
            .col_expr(users::Column::Budget, Expr::value(user.budget))
            .filter(users::Column::Id.eq(user.id))
            .exec(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn update_user_budget(&self, id: Uuid, budget: f64) -> GatewayResult<u64> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::Budget, Expr::value(budget))
            .filter(users::Column::Id.eq(id))
            .exec(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_user(&self, id: Uuid) -> GatewayResult<u64> {
        // The foreign key cascades as well; deleting explicitly keeps the
        // guarantee when the connection runs with foreign keys disabled.
        let db_tx = self.database.begin().await.map_err(map_db_err)?;
        transactions::Entity::delete_many()
            .filter(transactions::Column::UserId.eq(id))
            .exec(&db_tx)
            .await
            .map_err(map_db_err)?;
        let result = users::Entity::delete_by_id(id)
            .exec(&db_tx)
            .await
            .map_err(map_db_err)?;
        db_tx.commit().await.map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn select_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .order_by_desc(transactions::Column::CreatedTime)
            .all(&self.database)
            .await
            .map_err(map_db_err)?;
        rows_to_transactions(models)
    }

    async fn select_transaction(&self, id: Uuid) -> GatewayResult<Option<Transaction>> {
        transactions::Entity::find_by_id(id)
            .one(&self.database)
            .await
            .map_err(map_db_err)?
            .map(Transaction::try_from)
            .transpose()
    }

    async fn select_transactions_by_user(&self, user_id: Uuid) -> GatewayResult<Vec<Transaction>> {
        let models = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::CreatedTime)
            .all(&self.database)
            .await
            .map_err(map_db_err)?;
        rows_to_transactions(models)
    }

    async fn insert_transaction(
        &self,
        fields: &ValidTransaction,
    ) -> GatewayResult<InsertedTransaction> {
        let now = Utc::now();
        let inserted = InsertedTransaction {
            id: Uuid::new_v4(),
            created_time: Some(now),
            created_date: Some(now.date_naive()),
        };
        let tx = inserted.with_fields(fields.clone());
        transactions::Entity::insert(transactions::ActiveModel::from(&tx))
            .exec(&self.database)
            .await
            .map_err(|err| match map_db_err(err) {
                GatewayError::DomainViolation { column, .. } => GatewayError::DomainViolation {
                    column,
                    value: fields.category.as_str().to_string(),
                },
                other => other,
            })?;
        Ok(inserted)
    }

    async fn update_transaction(&self, tx: &Transaction) -> GatewayResult<u64> {
        let result = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::Description,
                Expr::value(tx.description.clone()),
            )
            .col_expr(transactions::Column::Amount, Expr::value(tx.amount))
            .col_expr(
                transactions::Column::Category,
                Expr::value(tx.category.as_str()),
            )
            .filter(transactions::Column::Id.eq(tx.id))
            .exec(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_transaction(&self, id: Uuid) -> GatewayResult<u64> {
        let result = transactions::Entity::delete_by_id(id)
            .exec(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn count_by_username(
        &self,
        username: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query.count(&self.database).await.map_err(map_db_err)?;
        Ok(Some(count))
    }

    async fn count_by_email(
        &self,
        email: &str,
        exclude: Option<Uuid>,
    ) -> GatewayResult<Option<u64>> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }
        let count = query.count(&self.database).await.map_err(map_db_err)?;
        Ok(Some(count))
    }

    async fn sum_spend_since(
        &self,
        user_id: Uuid,
        since: NaiveDate,
    ) -> GatewayResult<Option<f64>> {
        let total = transactions::Entity::find()
            .select_only()
            .column_as(Expr::col(transactions::Column::Amount).sum(), "total")
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CreatedDate.gte(since))
            .filter(transactions::Column::Amount.gt(0.0))
            .into_tuple::<Option<f64>>()
            .one(&self.database)
            .await
            .map_err(map_db_err)?;
        Ok(total.flatten())
    }
}

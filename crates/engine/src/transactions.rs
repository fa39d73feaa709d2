//! Transaction primitives.
//!
//! A `Transaction` is a single spend row owned by a user. `id`,
//! `created_time` and `created_date` are assigned by the gateway on insert.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, gateway::GatewayError, validation::ValidTransaction};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    /// Positive means spend. Non-positive amounts never pass validation.
    pub amount: f64,
    pub category: Category,
    pub created_time: Option<DateTime<Utc>>,
    pub created_date: Option<NaiveDate>,
}

impl Transaction {
    /// Whether the entry counts towards spend totals.
    pub fn is_spend(&self) -> bool {
        self.amount > 0.0
    }
}

/// Fields a gateway generates when it stores a transaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InsertedTransaction {
    pub id: Uuid,
    pub created_time: Option<DateTime<Utc>>,
    pub created_date: Option<NaiveDate>,
}

impl InsertedTransaction {
    /// Builds the record from the stored fields when no row can be re-read.
    pub(crate) fn with_fields(self, fields: ValidTransaction) -> Transaction {
        Transaction {
            id: self.id,
            user_id: fields.user_id,
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            created_time: self.created_time,
            created_date: self.created_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub created_time: Option<DateTimeUtc>,
    pub created_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id),
            description: ActiveValue::Set(tx.description.clone()),
            amount: ActiveValue::Set(tx.amount),
            category: ActiveValue::Set(tx.category.as_str().to_string()),
            created_time: ActiveValue::Set(tx.created_time),
            created_date: ActiveValue::Set(tx.created_date),
        }
    }
}

/// A stored category outside the closed set is a domain violation.
impl TryFrom<Model> for Transaction {
    type Error = GatewayError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let category = Category::try_from(model.category.as_str()).map_err(|_| {
            GatewayError::DomainViolation {
                column: "category".to_string(),
                value: model.category.clone(),
            }
        })?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            description: model.description,
            amount: model.amount,
            category,
            created_time: model.created_time,
            created_date: model.created_date,
        })
    }
}

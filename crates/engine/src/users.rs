//! Users: budget owners.
//!
//! A user owns its transactions; deleting the user deletes them too.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Total allowance for the tracked period.
    pub budget: f64,
}

/// Candidate for `Engine::add_user`.
///
/// When `id` is set the user is stored verbatim (seeding/import), otherwise
/// the gateway generates one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: Option<Uuid>,
    pub username: String,
    pub email: String,
    pub budget: f64,
}

impl NewUser {
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, budget: f64) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
            budget,
        }
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub(crate) fn into_user(self, id: Uuid) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            budget: self.budget,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub budget: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            id: ActiveValue::Set(user.id),
            username: ActiveValue::Set(user.username.clone()),
            email: ActiveValue::Set(user.email.clone()),
            budget: ActiveValue::Set(user.budget),
        }
    }
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            budget: model.budget,
        }
    }
}

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User,
    gateway::{Gateway, GatewayError, MemoryGateway, SqlGateway},
};

mod reports;
mod transactions;
mod uniqueness;
mod users;

/// Entry point for every budget operation.
///
/// The engine keeps no state between calls: each operation reads what it
/// needs from the gateway and returns.
#[derive(Clone)]
pub struct Engine {
    gateway: Arc<dyn Gateway>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    async fn require_user(&self, user_id: Uuid) -> ResultEngine<User> {
        self.gateway
            .select_user(user_id)
            .await?
            .ok_or(EngineError::UserNotFound)
    }
}

/// Translation of a failed transaction write.
fn transaction_write_error(err: GatewayError) -> EngineError {
    match err {
        GatewayError::ForeignKeyViolation { .. } => EngineError::InvalidUserId,
        GatewayError::DomainViolation { value, .. } => EngineError::InvalidCategory(value),
        other => {
            tracing::error!("transaction write failed: {other}");
            other.into()
        }
    }
}

/// Translation of a failed user write, keyed off the constraint that fired.
fn user_write_error(err: GatewayError) -> EngineError {
    match err {
        GatewayError::UniqueViolation { constraint } if constraint == "id" => {
            EngineError::DuplicateId
        }
        GatewayError::UniqueViolation { constraint } if constraint.contains("email") => {
            EngineError::DuplicateEmail
        }
        GatewayError::UniqueViolation { constraint } if constraint.contains("username") => {
            EngineError::DuplicateUsername
        }
        other => {
            tracing::error!("user write failed: {other}");
            other.into()
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    gateway: Option<Arc<dyn Gateway>>,
}

impl EngineBuilder {
    /// Store data in the relational database behind `db`.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.gateway = Some(Arc::new(SqlGateway::new(db)));
        self
    }

    /// Use any gateway implementation.
    pub fn gateway(mut self, gateway: Arc<dyn Gateway>) -> EngineBuilder {
        self.gateway = Some(gateway);
        self
    }

    /// Construct `Engine`. Without a configured gateway data stays in memory.
    pub fn build(self) -> Engine {
        Engine {
            gateway: self
                .gateway
                .unwrap_or_else(|| Arc::new(MemoryGateway::new())),
        }
    }
}

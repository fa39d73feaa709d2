//! The module contains the errors the engine can throw.
//!
//! Every variant belongs to one [`ErrorKind`]:
//!
//! - [`Validation`]: the caller sent something it can correct.
//! - [`NotFound`]: a user or transaction is absent (or owned by someone else).
//! - [`Conflict`]: a uniqueness or integrity rule rejected the write.
//! - [`System`]: the storage backend failed.
//!
//!  [`Validation`]: ErrorKind::Validation
//!  [`NotFound`]: ErrorKind::NotFound
//!  [`Conflict`]: ErrorKind::Conflict
//!  [`System`]: ErrorKind::System
use thiserror::Error;

use crate::gateway::GatewayError;

/// Coarse classification used by presentation layers to pick a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    System,
}

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("userId is required")]
    MissingUserId,
    #[error("description is required")]
    MissingDescription,
    #[error("description must not be blank")]
    BlankDescription,
    #[error("amount must be a number")]
    InvalidAmountType,
    #[error("amount must be greater than zero")]
    AmountNotPositive,
    #[error("category is required")]
    MissingCategory,
    #[error("category must not be blank")]
    BlankCategory,
    #[error("invalid category: \"{0}\"")]
    InvalidCategory(String),
    #[error("no valid fields to update")]
    NoValidFields,
    #[error("budget must be a number")]
    InvalidBudgetFormat,
    #[error("budget must not be negative")]
    NegativeBudget,
    #[error("username must not be blank")]
    BlankUsername,
    #[error("email must not be blank")]
    BlankEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("userId does not reference an existing user")]
    InvalidUserId,
    #[error("username already taken")]
    DuplicateUsername,
    #[error("email already taken")]
    DuplicateEmail,
    #[error("a user with this id already exists")]
    DuplicateId,
    #[error("update failed: no rows affected")]
    UpdateFailed,
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("export failed: {0}")]
    ExportFailed(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingUserId
            | Self::MissingDescription
            | Self::BlankDescription
            | Self::InvalidAmountType
            | Self::AmountNotPositive
            | Self::MissingCategory
            | Self::BlankCategory
            | Self::InvalidCategory(_)
            | Self::NoValidFields
            | Self::InvalidBudgetFormat
            | Self::NegativeBudget
            | Self::BlankUsername
            | Self::BlankEmail => ErrorKind::Validation,
            Self::UserNotFound | Self::TransactionNotFound => ErrorKind::NotFound,
            Self::InvalidUserId
            | Self::DuplicateUsername
            | Self::DuplicateEmail
            | Self::DuplicateId => ErrorKind::Conflict,
            Self::UpdateFailed | Self::StorageUnavailable(_) | Self::ExportFailed(_) => {
                ErrorKind::System
            }
        }
    }
}

/// Anything the caller did not anticipate is fatal; constraint violations are
/// translated by each operation before falling back to this.
impl From<GatewayError> for EngineError {
    fn from(value: GatewayError) -> Self {
        Self::StorageUnavailable(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_correctable() {
        assert_eq!(EngineError::BlankDescription.kind(), ErrorKind::Validation);
        assert_eq!(EngineError::NegativeBudget.kind(), ErrorKind::Validation);
        assert_eq!(EngineError::NoValidFields.kind(), ErrorKind::Validation);
    }

    #[test]
    fn duplicates_are_conflicts() {
        assert_eq!(EngineError::DuplicateEmail.kind(), ErrorKind::Conflict);
        assert_eq!(EngineError::InvalidUserId.kind(), ErrorKind::Conflict);
        assert_eq!(EngineError::DuplicateId.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn gateway_failure_becomes_storage_unavailable() {
        let err = EngineError::from(GatewayError::Other("disk full".to_string()));
        assert_eq!(err.kind(), ErrorKind::System);
        assert!(err.to_string().contains("disk full"));
    }
}

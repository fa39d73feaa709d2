use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionDraft, TransactionPatch,
    validation::{validate_draft, validate_patch},
};

use super::{Engine, transaction_write_error};

impl Engine {
    /// Validates and stores a new transaction.
    ///
    /// The stored row is read back to pick up the generated id and
    /// timestamps. If the gateway does not echo a row, the candidate is
    /// returned with the generated fields instead.
    pub async fn create_transaction(&self, draft: &TransactionDraft) -> ResultEngine<Transaction> {
        let fields = validate_draft(draft)?;

        let inserted = self
            .gateway
            .insert_transaction(&fields)
            .await
            .map_err(transaction_write_error)?;
        tracing::debug!(
            transaction_id = %inserted.id,
            user_id = %fields.user_id,
            "transaction created"
        );

        match self.gateway.select_transaction(inserted.id).await? {
            Some(tx) => Ok(tx),
            None => {
                tracing::warn!(transaction_id = %inserted.id, "inserted transaction not echoed back");
                Ok(inserted.with_fields(fields))
            }
        }
    }

    /// Applies a patch: only supplied keys are validated and changed.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        patch: &TransactionPatch,
    ) -> ResultEngine<Transaction> {
        let existing = self
            .gateway
            .select_transaction(transaction_id)
            .await?
            .ok_or(EngineError::TransactionNotFound)?;
        let patch = validate_patch(patch)?;

        let updated = patch.apply_to(&existing);
        let rows = self
            .gateway
            .update_transaction(&updated)
            .await
            .map_err(transaction_write_error)?;
        if rows == 0 {
            return Err(EngineError::UpdateFailed);
        }
        tracing::debug!(transaction_id = %transaction_id, "transaction updated");

        self.gateway
            .select_transaction(transaction_id)
            .await?
            .ok_or(EngineError::TransactionNotFound)
    }

    /// Returns `false` when no row was removed.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<bool> {
        let rows = self.gateway.delete_transaction(transaction_id).await?;
        tracing::debug!(transaction_id = %transaction_id, rows, "transaction delete");
        Ok(rows > 0)
    }

    /// All transactions, newest first.
    pub async fn transactions(&self) -> ResultEngine<Vec<Transaction>> {
        Ok(self.gateway.select_transactions().await?)
    }

    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        self.gateway
            .select_transaction(transaction_id)
            .await?
            .ok_or(EngineError::TransactionNotFound)
    }

    /// One user's transactions, newest first.
    pub async fn user_transactions(&self, user_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        self.require_user(user_id).await?;
        Ok(self.gateway.select_transactions_by_user(user_id).await?)
    }

    /// A transaction addressed through its owner.
    ///
    /// A transaction that exists but belongs to someone else is reported as
    /// not found.
    pub async fn user_transaction(
        &self,
        user_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        self.require_user(user_id).await?;
        self.gateway
            .select_transaction(transaction_id)
            .await?
            .filter(|tx| tx.user_id == user_id)
            .ok_or(EngineError::TransactionNotFound)
    }
}

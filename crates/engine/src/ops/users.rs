use uuid::Uuid;

use crate::{
    EngineError, NewUser, ResultEngine, User, UserPatch,
    validation::{validate_email, validate_user_patch, validate_username},
};

use super::{Engine, user_write_error};

impl Engine {
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        Ok(self.gateway.select_users().await?)
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        self.require_user(user_id).await
    }

    /// Creates a user.
    ///
    /// A candidate carrying an id is stored with it (seeding/import).
    /// Callers are expected to check uniqueness first; a collision reported by
    /// the gateway still surfaces as `DuplicateUsername` / `DuplicateEmail`,
    /// and a seeded id that is already taken as `DuplicateId`.
    pub async fn add_user(&self, candidate: NewUser) -> ResultEngine<User> {
        let candidate = NewUser {
            username: validate_username(&candidate.username)?,
            email: validate_email(&candidate.email)?,
            ..candidate
        };

        let id = self
            .gateway
            .insert_user(&candidate)
            .await
            .map_err(user_write_error)?;
        tracing::debug!(user_id = %id, username = %candidate.username, "user created");

        match self.gateway.select_user(id).await? {
            Some(user) => Ok(user),
            None => Ok(candidate.into_user(id)),
        }
    }

    /// Applies a partial update in place; the id never changes.
    pub async fn update_user(&self, user_id: Uuid, patch: &UserPatch) -> ResultEngine<User> {
        let existing = self.require_user(user_id).await?;
        let patch = validate_user_patch(patch)?;

        if let Some(username) = &patch.username
            && self.username_exists(username, Some(user_id)).await?
        {
            return Err(EngineError::DuplicateUsername);
        }
        if let Some(email) = &patch.email
            && self.email_exists(email, Some(user_id)).await?
        {
            return Err(EngineError::DuplicateEmail);
        }

        let updated = patch.apply_to(&existing);
        let rows = self
            .gateway
            .update_user(&updated)
            .await
            .map_err(user_write_error)?;
        if rows == 0 {
            return Err(EngineError::UpdateFailed);
        }
        tracing::debug!(user_id = %user_id, "user updated");

        self.require_user(user_id).await
    }

    /// Deletes the user and its transactions. Returns `false` if nothing was
    /// removed.
    pub async fn delete_user(&self, user_id: Uuid) -> ResultEngine<bool> {
        let rows = self.gateway.delete_user(user_id).await?;
        tracing::debug!(user_id = %user_id, rows, "user delete");
        Ok(rows > 0)
    }
}

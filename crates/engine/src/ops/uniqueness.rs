use uuid::Uuid;

use crate::ResultEngine;

use super::Engine;

impl Engine {
    /// Whether another user already has `username`.
    ///
    /// `exclude` skips one user, so checking an update against the record's
    /// own current value is not a collision. A missing count means "not
    /// taken".
    pub async fn username_exists(&self, username: &str, exclude: Option<Uuid>) -> ResultEngine<bool> {
        let count = self.gateway.count_by_username(username, exclude).await?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// Whether another user already has `email`. See [`Engine::username_exists`].
    pub async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> ResultEngine<bool> {
        let count = self.gateway.count_by_email(email, exclude).await?;
        Ok(count.unwrap_or(0) > 0)
    }
}

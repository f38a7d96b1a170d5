use async_trait::async_trait;
use salesdesk_core::{AppResult, AuthenticatedUser, UserId};

/// Port onto the user records owned by the surrounding CRUD system.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user and the tenant it belongs to.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<AuthenticatedUser>>;
}

// User Repository Port (Interface)

use crate::domain::User;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken email is `AppError::Conflict`
    async fn insert(&self, user: &User) -> Result<()>;

    /// Lookup by (lowercase) email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

// Feedback Repository Port (Interface)

use crate::domain::Feedback;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn insert(&self, feedback: &Feedback) -> Result<()>;

    async fn count(&self) -> Result<i64>;
}

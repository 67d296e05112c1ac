// Feedback Service

use crate::domain::{Feedback, FeedbackId, FeedbackRequest};
use crate::error::Result;
use crate::port::{FeedbackRepository, IdProvider, TimeProvider};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl FeedbackService {
    pub fn new(
        feedback: Arc<dyn FeedbackRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            feedback,
            id_provider,
            time_provider,
        }
    }

    /// Validate and store one feedback entry
    pub async fn submit(&self, req: FeedbackRequest) -> Result<FeedbackId> {
        let req = FeedbackRequest {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            message: req.message.trim().to_string(),
            ..req
        };
        req.validate()?;

        let feedback = Feedback {
            id: self.id_provider.generate_id(),
            name: req.name,
            email: req.email,
            rating: req.rating,
            message: req.message,
            created_at: self.time_provider.now_millis(),
        };
        self.feedback.insert(&feedback).await?;

        info!(feedback_id = %feedback.id, rating = feedback.rating, "Feedback recorded");
        Ok(feedback.id)
    }
}

// Feedback Domain Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Feedback ID (UUID v4)
pub type FeedbackId = String;

/// Feedback as submitted by a visitor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "email is not valid"))]
    pub email: String,

    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,

    #[serde(default)]
    #[validate(length(max = 2000, message = "message is too long"))]
    pub message: String,
}

/// Stored feedback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub id: FeedbackId,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub message: String,
    pub created_at: i64,
}

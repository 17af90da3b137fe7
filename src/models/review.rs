use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::validation::{validate_optional_text, validate_rating, MAX_LONG_TEXT_LEN};

/// At most one review exists per (user, book).
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(user_id: Uuid, book_id: Uuid, rating: i32, comment: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn revise(&mut self, rating: i32, comment: Option<String>) {
        self.rating = rating;
        self.comment = comment;
        self.updated_at = Utc::now();
    }
}

/// Review joined with the reviewer's username.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub book_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_rating(self.rating)?;
        validate_optional_text(self.comment.as_deref(), "comment", MAX_LONG_TEXT_LEN)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_rating(self.rating)?;
        validate_optional_text(self.comment.as_deref(), "comment", MAX_LONG_TEXT_LEN)
    }
}

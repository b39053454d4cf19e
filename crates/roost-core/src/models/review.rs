//! Review domain model and rating aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RoostError, RoostResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub rating: u8,
    pub comment: String,
    /// Soft-delete marker; content is retained.
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review with its author's display name resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewWithAuthor {
    pub review: Review,
    /// `None` if the author account no longer exists.
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub rating: u8,
    pub comment: String,
}

impl CreateReview {
    pub fn validate(&self) -> RoostResult<()> {
        validate_review_content(self.rating, &self.comment)
    }
}

/// Rating must lie in `[MIN_RATING, MAX_RATING]`; comment must be non-blank.
pub fn validate_review_content(rating: u8, comment: &str) -> RoostResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(RoostError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    if comment.trim().is_empty() {
        return Err(RoostError::validation("comment must not be empty"));
    }
    Ok(())
}

/// Arithmetic mean of the given ratings, or `None` for an empty input.
pub fn mean_rating<I>(ratings: I) -> Option<f64>
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), r| (sum + u64::from(r), count + 1));
    (count > 0).then(|| sum as f64 / count as f64)
}

//! Review aggregator.
//!
//! Every add, edit and delete is followed by a full recomputation of
//! the property's aggregate rating from its non-deleted reviews.
//! Concurrent recomputations race; the last write wins.

use roost_core::error::{RoostError, RoostResult};
use roost_core::models::review::{
    CreateReview, Review, ReviewWithAuthor, mean_rating, validate_review_content,
};
use roost_core::ports::ObjectStorage;
use roost_core::repository::{
    BookingRepository, PropertyRepository, ReviewRepository, UserRepository,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::property::PropertyRegistry;

/// Review aggregator.
///
/// Confirms stays through `B` and writes ratings back through the
/// property registry.
pub struct ReviewAggregator<R, B, P, S, U>
where
    R: ReviewRepository,
    B: BookingRepository,
    P: PropertyRepository,
    S: ObjectStorage,
    U: UserRepository,
{
    review_repo: R,
    booking_repo: B,
    properties: PropertyRegistry<P, S>,
    user_repo: U,
}

impl<R, B, P, S, U> ReviewAggregator<R, B, P, S, U>
where
    R: ReviewRepository,
    B: BookingRepository,
    P: PropertyRepository,
    S: ObjectStorage,
    U: UserRepository,
{
    pub fn new(
        review_repo: R,
        booking_repo: B,
        properties: PropertyRegistry<P, S>,
        user_repo: U,
    ) -> Self {
        Self {
            review_repo,
            booking_repo,
            properties,
            user_repo,
        }
    }

    /// Review a property the guest has completed a stay at.
    pub async fn add_review(
        &self,
        guest_id: Uuid,
        property_id: Uuid,
        rating: u8,
        comment: String,
    ) -> RoostResult<Review> {
        let input = CreateReview {
            property_id,
            guest_id,
            rating,
            comment,
        };
        input.validate()?;

        // Stay rule first: an unknown property without a stay is
        // BusinessRule, not NotFound.
        if !self
            .booking_repo
            .has_completed_stay(guest_id, property_id)
            .await?
        {
            return Err(RoostError::business_rule(
                "only guests with a completed stay can review this property",
            ));
        }
        self.properties.get_property(property_id).await?;

        let review = self.review_repo.create(input).await?;
        let average = self.recompute_rating(property_id).await?;

        info!(
            review_id = %review.id,
            property_id = %property_id,
            guest_id = %guest_id,
            average_rating = ?average,
            "Review added"
        );
        Ok(review)
    }

    /// Non-deleted reviews with author names, oldest first.
    ///
    /// A property with no reviews yields `NotFound`.
    pub async fn list_reviews_for_property(
        &self,
        property_id: Uuid,
    ) -> RoostResult<Vec<ReviewWithAuthor>> {
        let reviews = self.review_repo.list_active_by_property(property_id).await?;
        if reviews.is_empty() {
            return Err(RoostError::NotFound {
                entity: "review".into(),
                id: format!("property_id={property_id}"),
            });
        }

        let mut resolved = Vec::with_capacity(reviews.len());
        for review in reviews {
            let author_name = match self.user_repo.get_by_id(review.guest_id).await {
                Ok(user) => Some(user.name),
                Err(RoostError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            };
            resolved.push(ReviewWithAuthor {
                review,
                author_name,
            });
        }
        Ok(resolved)
    }

    /// Edit the rating and comment of the guest's own review.
    pub async fn update_review(
        &self,
        guest_id: Uuid,
        review_id: Uuid,
        rating: u8,
        comment: String,
    ) -> RoostResult<Review> {
        validate_review_content(rating, &comment)?;
        self.review_repo
            .get_active_by_author(review_id, guest_id)
            .await?;

        let review = self
            .review_repo
            .update_content(review_id, rating, comment)
            .await?;
        self.recompute_rating(review.property_id).await?;

        info!(review_id = %review_id, guest_id = %guest_id, "Review updated");
        Ok(review)
    }

    /// Soft-delete the guest's own review.
    pub async fn delete_review(&self, guest_id: Uuid, review_id: Uuid) -> RoostResult<Review> {
        self.review_repo
            .get_active_by_author(review_id, guest_id)
            .await?;

        let review = self.review_repo.soft_delete(review_id).await?;
        self.recompute_rating(review.property_id).await?;

        info!(review_id = %review_id, guest_id = %guest_id, "Review deleted");
        Ok(review)
    }

    /// Recompute and store the mean of non-deleted ratings.
    ///
    /// Returns the stored value; `None` clears the rating. A property
    /// that has since been deleted is skipped.
    pub async fn recompute_rating(&self, property_id: Uuid) -> RoostResult<Option<f64>> {
        let reviews = self.review_repo.list_active_by_property(property_id).await?;
        let average = mean_rating(reviews.iter().map(|r| r.rating));

        match self.properties.apply_rating(property_id, average).await {
            Ok(()) => Ok(average),
            Err(RoostError::NotFound { .. }) => {
                debug!(property_id = %property_id, "Rating not stored; property deleted");
                Ok(average)
            }
            Err(e) => Err(e),
        }
    }
}

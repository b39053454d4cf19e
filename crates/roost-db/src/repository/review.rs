//! SurrealDB implementation of [`ReviewRepository`].

use chrono::{DateTime, Utc};
use roost_core::error::RoostResult;
use roost_core::models::review::{CreateReview, Review};
use roost_core::repository::ReviewRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ReviewRow {
    property_id: String,
    guest_id: String,
    rating: u32,
    comment: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ReviewRowWithId {
    record_id: String,
    property_id: String,
    guest_id: String,
    rating: u32,
    comment: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self, id: Uuid) -> Result<Review, DbError> {
        let rating = u8::try_from(self.rating)
            .map_err(|_| DbError::decode("review", format!("rating {} out of range", self.rating)))?;
        Ok(Review {
            id,
            property_id: parse_uuid("review", "property", &self.property_id)?,
            guest_id: parse_uuid("review", "guest", &self.guest_id)?,
            rating,
            comment: self.comment,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ReviewRowWithId {
    fn try_into_review(self) -> Result<Review, DbError> {
        let id = parse_uuid("review", "record", &self.record_id)?;
        ReviewRow {
            property_id: self.property_id,
            guest_id: self.guest_id,
            rating: self.rating,
            comment: self.comment,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_review(id)
    }
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, input: CreateReview) -> RoostResult<Review> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('review', $id) SET \
                 property_id = $property_id, \
                 guest_id = $guest_id, \
                 rating = $rating, \
                 comment = $comment, \
                 is_deleted = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("guest_id", input.guest_id.to_string()))
            .bind(("rating", u32::from(input.rating)))
            .bind(("comment", input.comment))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn get_active_by_author(&self, id: Uuid, guest_id: Uuid) -> RoostResult<Review> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('review', $id) \
                 WHERE guest_id = $guest_id AND is_deleted = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("guest_id", guest_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn list_active_by_property(&self, property_id: Uuid) -> RoostResult<Vec<Review>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE property_id = $property_id AND is_deleted = false \
                 ORDER BY created_at ASC",
            )
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let reviews = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(reviews)
    }

    async fn update_content(&self, id: Uuid, rating: u8, comment: String) -> RoostResult<Review> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('review', $id) SET \
                 rating = $rating, comment = $comment, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("rating", u32::from(rating)))
            .bind(("comment", comment))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }

    async fn soft_delete(&self, id: Uuid) -> RoostResult<Review> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('review', $id) SET \
                 is_deleted = true, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "review".into(),
            id: id_str,
        })?;

        Ok(row.into_review(id)?)
    }
}

//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations perform no
//! authorization; ownership and authorship checks live in the services.

use uuid::Uuid;

use crate::error::RoostResult;
use crate::models::{
    booking::{Booking, BookingStatus, CreateBooking, PaymentStatus},
    host_request::{CreateHostRequest, HostRequest, HostRequestStatus},
    property::{CreateProperty, Property, PropertyFilter, UpdateProperty},
    review::{CreateReview, Review},
    user::{CreateUser, UpdateUser, User},
};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = RoostResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RoostResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = RoostResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = RoostResult<User>> + Send;
}

pub trait PropertyRepository: Send + Sync {
    fn create(&self, input: CreateProperty)
    -> impl Future<Output = RoostResult<Property>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RoostResult<Property>> + Send;
    /// Full-document update; concurrent writers race, last write wins.
    fn update(
        &self,
        id: Uuid,
        input: UpdateProperty,
    ) -> impl Future<Output = RoostResult<Property>> + Send;
    /// Hard delete. Bookings and reviews referencing the property are kept.
    fn delete(&self, id: Uuid) -> impl Future<Output = RoostResult<()>> + Send;
    fn list(
        &self,
        filter: PropertyFilter,
    ) -> impl Future<Output = RoostResult<Vec<Property>>> + Send;
    /// Overwrite the derived aggregate rating (`None` clears it).
    fn set_rating(
        &self,
        id: Uuid,
        rating: Option<f64>,
    ) -> impl Future<Output = RoostResult<()>> + Send;
}

pub trait BookingRepository: Send + Sync {
    fn create(&self, input: CreateBooking) -> impl Future<Output = RoostResult<Booking>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = RoostResult<Booking>> + Send;
    /// Ordered by creation time, then id.
    fn list_by_guest(
        &self,
        guest_id: Uuid,
    ) -> impl Future<Output = RoostResult<Vec<Booking>>> + Send;
    fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> impl Future<Output = RoostResult<Booking>> + Send;
    fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> impl Future<Output = RoostResult<Booking>> + Send;
    /// Whether `guest_id` has a completed booking for `property_id`.
    fn has_completed_stay(
        &self,
        guest_id: Uuid,
        property_id: Uuid,
    ) -> impl Future<Output = RoostResult<bool>> + Send;
}

pub trait ReviewRepository: Send + Sync {
    fn create(&self, input: CreateReview) -> impl Future<Output = RoostResult<Review>> + Send;
    /// Fetch a non-deleted review written by `guest_id`.
    fn get_active_by_author(
        &self,
        id: Uuid,
        guest_id: Uuid,
    ) -> impl Future<Output = RoostResult<Review>> + Send;
    /// All non-deleted reviews for a property, oldest first.
    fn list_active_by_property(
        &self,
        property_id: Uuid,
    ) -> impl Future<Output = RoostResult<Vec<Review>>> + Send;
    fn update_content(
        &self,
        id: Uuid,
        rating: u8,
        comment: String,
    ) -> impl Future<Output = RoostResult<Review>> + Send;
    /// Soft-delete: sets `is_deleted`.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = RoostResult<Review>> + Send;
}

pub trait HostRequestRepository: Send + Sync {
    fn create(
        &self,
        input: CreateHostRequest,
    ) -> impl Future<Output = RoostResult<HostRequest>> + Send;
    /// The user's open request, if any.
    fn find_pending_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = RoostResult<Option<HostRequest>>> + Send;
    /// All open requests, oldest first.
    fn list_pending(&self) -> impl Future<Output = RoostResult<Vec<HostRequest>>> + Send;
    /// Close every open request of the user with `status`, returning
    /// the closed requests oldest first. Empty when none were open.
    fn decide_pending(
        &self,
        user_id: Uuid,
        status: HostRequestStatus,
        decided_by: Uuid,
    ) -> impl Future<Output = RoostResult<Vec<HostRequest>>> + Send;
}

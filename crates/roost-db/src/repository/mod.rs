//! SurrealDB repository implementations.

mod booking;
mod host_request;
mod property;
mod review;
mod user;

pub use booking::SurrealBookingRepository;
pub use host_request::SurrealHostRequestRepository;
pub use property::SurrealPropertyRepository;
pub use review::SurrealReviewRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

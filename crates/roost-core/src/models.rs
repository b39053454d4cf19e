//! Domain models for Roost.
//!
//! Input types (`Create*`, `Update*`) carry explicit `validate`
//! functions; nothing is coerced or defaulted silently at the
//! persistence layer.

pub mod booking;
pub mod host_request;
pub mod property;
pub mod review;
pub mod user;

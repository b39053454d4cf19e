//! Roost Core: domain models, error types, repository traits and
//! collaborator ports shared by every Roost crate.

pub mod error;
pub mod models;
pub mod password;
pub mod ports;
pub mod repository;

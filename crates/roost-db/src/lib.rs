//! Roost Database: SurrealDB connection management, schema
//! migrations, repository implementations, and the SurrealDB-backed
//! ephemeral token store and durable work queue.

mod connection;
mod error;
mod queue;
pub mod repository;
mod schema;
mod token_store;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use queue::SurrealWorkQueue;
pub use schema::{run_migrations, schema_v1};
pub use token_store::SurrealTokenStore;

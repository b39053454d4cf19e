//! Database-specific error types and conversions.

use roost_core::error::RoostError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query rejected: {0}")]
    Query(String),

    #[error("Malformed {entity} record: {message}")]
    Decode { entity: &'static str, message: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn decode(entity: &'static str, message: impl ToString) -> Self {
        Self::Decode {
            entity,
            message: message.to_string(),
        }
    }

    /// Classify as a collaborator failure rather than a record-store one.
    pub(crate) fn into_external(self, service: &str) -> RoostError {
        match self {
            DbError::NotFound { entity, id } => RoostError::NotFound { entity, id },
            other => RoostError::external(service, other),
        }
    }
}

impl From<DbError> for RoostError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => RoostError::NotFound { entity, id },
            other => RoostError::Database(other.to_string()),
        }
    }
}

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(entity: &'static str, field: &str, raw: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(raw).map_err(|e| DbError::decode(entity, format!("invalid {field} UUID: {e}")))
}

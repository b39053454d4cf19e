//! Error types for the Roost marketplace core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoostError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Business rule violated: {message}")]
    BusinessRule { message: String },

    #[error("External service {service} failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RoostError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::AuthorizationDenied {
            reason: reason.into(),
        }
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRule {
            message: message.into(),
        }
    }

    pub fn external(service: impl Into<String>, message: impl ToString) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.to_string(),
        }
    }
}

pub type RoostResult<T> = Result<T, RoostError>;

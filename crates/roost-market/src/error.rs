//! Marketplace service error types.

use roost_core::error::RoostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is blocked")]
    AccountBlocked,

    #[error("invalid or expired verification token")]
    InvalidVerificationToken,

    #[error("malformed queue message: {0}")]
    MalformedMessage(String),
}

impl From<MarketError> for RoostError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::InvalidCredentials | MarketError::AccountBlocked => {
                RoostError::AuthenticationFailed {
                    reason: err.to_string(),
                }
            }
            MarketError::InvalidVerificationToken => RoostError::business_rule(err.to_string()),
            MarketError::MalformedMessage(msg) => RoostError::external("work_queue", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_are_authentication_failures() {
        assert!(matches!(
            RoostError::from(MarketError::InvalidCredentials),
            RoostError::AuthenticationFailed { .. }
        ));
        assert!(matches!(
            RoostError::from(MarketError::AccountBlocked),
            RoostError::AuthenticationFailed { .. }
        ));
    }

    #[test]
    fn bad_token_is_business_rule() {
        let err = RoostError::from(MarketError::InvalidVerificationToken);
        assert_eq!(
            err.to_string(),
            "Business rule violated: invalid or expired verification token"
        );
    }
}

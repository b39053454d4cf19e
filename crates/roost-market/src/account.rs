//! Account registration, e-mail verification, one-time passcodes and
//! credential checks.
//!
//! Short-lived secrets live in the [`TokenStore`]: verification tokens
//! under `verify:{user_id}` (stored as their SHA-256 digest) and
//! passcodes under `otp:{email}`. Delivery goes through the
//! [`Notifier`]; a failed send is logged and otherwise ignored.

use std::time::Duration;

use roost_core::error::{RoostError, RoostResult};
use roost_core::models::user::{AccountStatus, CreateUser, UpdateUser, User};
use roost_core::password::PasswordHasher;
use roost_core::ports::{Notifier, TokenStore, VerificationMessage};
use roost_core::repository::UserRepository;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::MarketConfig;
use crate::error::MarketError;
use crate::token;

pub struct AccountService<U: UserRepository, T: TokenStore, N: Notifier> {
    user_repo: U,
    tokens: T,
    notifier: N,
    hasher: PasswordHasher,
    config: MarketConfig,
}

impl<U: UserRepository, T: TokenStore, N: Notifier> AccountService<U, T, N> {
    pub fn new(user_repo: U, tokens: T, notifier: N, config: MarketConfig) -> Self {
        Self {
            user_repo,
            tokens,
            notifier,
            hasher: PasswordHasher::new(config.pepper.clone()),
            config,
        }
    }

    /// Create a pending, unverified guest account and send its
    /// verification link.
    pub async fn register_user(&self, input: CreateUser) -> RoostResult<User> {
        input.validate(self.config.min_password_length)?;

        match self.user_repo.get_by_email(&input.email).await {
            Ok(_) => {
                return Err(RoostError::business_rule(format!(
                    "email {} is already registered",
                    input.email
                )));
            }
            Err(RoostError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let user = self.user_repo.create(input).await?;

        let raw = token::generate_verification_token();
        self.tokens
            .set(
                &token::verification_key(user.id),
                &token::hash_token(&raw),
                Duration::from_secs(self.config.verification_ttl_secs),
            )
            .await?;

        let link = format!(
            "{}?user={}&token={}",
            self.config.verification_url_base, user.id, raw
        );
        self.notify(&user.email, VerificationMessage::EmailVerification { link })
            .await;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Consume a verification token; the account becomes verified and
    /// active.
    pub async fn verify_email(&self, user_id: Uuid, raw_token: &str) -> RoostResult<User> {
        let key = token::verification_key(user_id);
        let stored = self.tokens.get(&key).await?;
        if stored.as_deref() != Some(token::hash_token(raw_token).as_str()) {
            return Err(MarketError::InvalidVerificationToken.into());
        }

        let user = self
            .user_repo
            .update(
                user_id,
                UpdateUser {
                    verified: Some(true),
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await?;
        self.tokens.delete(&key).await?;

        info!(user_id = %user_id, "Email verified");
        Ok(user)
    }

    /// Issue a passcode to `email`, replacing any earlier one.
    pub async fn issue_otp(&self, email: &str) -> RoostResult<()> {
        let code = token::generate_otp(self.config.otp_length);
        self.tokens
            .set(
                &token::otp_key(email),
                &code,
                Duration::from_secs(self.config.otp_ttl_secs),
            )
            .await?;

        self.notify(
            email,
            VerificationMessage::OneTimePasscode {
                code,
                expires_in_secs: self.config.otp_ttl_secs,
            },
        )
        .await;
        Ok(())
    }

    /// Whether `code` is the live passcode for `email`. A match
    /// consumes it.
    pub async fn verify_otp(&self, email: &str, code: &str) -> RoostResult<bool> {
        let key = token::otp_key(email);
        match self.tokens.get(&key).await? {
            Some(stored) if stored == code => {
                self.tokens.delete(&key).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Check an e-mail and password pair.
    ///
    /// Unknown e-mails and wrong passwords are indistinguishable to the
    /// caller. Blocked accounts are refused.
    pub async fn check_credentials(&self, email: &str, password: &str) -> RoostResult<User> {
        let user = match self.user_repo.get_by_email(email).await {
            Ok(user) => user,
            Err(RoostError::NotFound { .. }) => return Err(MarketError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(MarketError::InvalidCredentials.into());
        }
        if user.status == AccountStatus::Blocked {
            return Err(MarketError::AccountBlocked.into());
        }

        Ok(user)
    }

    async fn notify(&self, destination: &str, message: VerificationMessage) {
        if let Err(e) = self
            .notifier
            .send_verification_message(destination, message)
            .await
        {
            warn!(destination, error = %e, "Verification message not delivered");
        }
    }
}

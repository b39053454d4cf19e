//! Argon2id password hashing shared by the user store and credential
//! checks.
//!
//! Hashing and verification must agree on the pepper, so both go
//! through [`PasswordHasher`].

use std::borrow::Cow;
use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};

use crate::error::{RoostError, RoostResult};

// m=19 MiB, t=2, p=1
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id hasher with an optional server-side pepper.
#[derive(Clone, Default)]
pub struct PasswordHasher {
    pepper: Option<String>,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl PasswordHasher {
    pub fn new(pepper: Option<String>) -> Self {
        Self { pepper }
    }

    /// Hash with a fresh random salt; returns a PHC string.
    pub fn hash(&self, password: &str) -> RoostResult<String> {
        use argon2::PasswordHasher as _;

        let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
            .map_err(|e| RoostError::Internal(format!("argon2 params: {e}")))?;
        let salt = SaltString::generate(&mut OsRng);

        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password(&self.peppered(password), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| RoostError::Internal(format!("password hashing: {e}")))
    }

    /// `Ok(false)` on mismatch. A stored value that is not a PHC string
    /// is an error, not a mismatch.
    pub fn verify(&self, password: &str, stored: &str) -> RoostResult<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| RoostError::Internal(format!("stored password hash: {e}")))?;

        match Argon2::default().verify_password(&self.peppered(password), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(RoostError::Internal(format!("password verification: {e}"))),
        }
    }

    fn peppered<'a>(&self, password: &'a str) -> Cow<'a, [u8]> {
        match &self.pepper {
            Some(pepper) => Cow::Owned(format!("{pepper}{password}").into_bytes()),
            None => Cow::Borrowed(password.as_bytes()),
        }
    }
}

//! Verification token and one-time passcode generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Random opaque e-mail verification token
/// (32 bytes, base64url without padding).
pub fn generate_verification_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// SHA-256 of a raw token, hex-encoded. Only this digest is stored.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Random numeric passcode of `length` digits; leading zeros are kept.
pub fn generate_otp(length: u32) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Storage key of a user's pending e-mail verification token.
pub fn verification_key(user_id: uuid::Uuid) -> String {
    format!("verify:{user_id}")
}

/// Storage key of the passcode issued to `email`.
pub fn otp_key(email: &str) -> String {
    format!("otp:{}", email.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_token_is_url_safe() {
        let token = generate_verification_token();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(token.len(), 43);
        assert_ne!(token, generate_verification_token());
    }

    #[test]
    fn token_hash_is_deterministic_hex() {
        let h = hash_token("abc");
        assert_eq!(h, hash_token("abc"));
        assert_ne!(h, hash_token("abd"));
        assert_eq!(h.len(), 64);
    }

    #[test]
    fn otp_has_requested_digits() {
        for _ in 0..50 {
            let code = generate_otp(6);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn otp_key_ignores_case() {
        assert_eq!(otp_key("Alice@Example.com"), otp_key("alice@example.com"));
    }
}

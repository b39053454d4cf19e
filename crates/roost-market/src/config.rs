//! Marketplace service configuration.

/// Configuration shared by the marketplace services.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Optional pepper prepended to passwords before Argon2id verification.
    /// Must match the pepper the user repository hashes with.
    pub pepper: Option<String>,
    /// Minimum password length accepted at registration.
    pub min_password_length: usize,
    /// E-mail verification token lifetime in seconds (default: 86_400 = 24 h).
    pub verification_ttl_secs: u64,
    /// One-time passcode lifetime in seconds (default: 300 = 5 minutes).
    pub otp_ttl_secs: u64,
    /// Number of decimal digits in a one-time passcode.
    pub otp_length: u32,
    /// Work queue carrying host-role requests to administrators.
    pub host_request_queue: String,
    /// Base URL of the verification link sent to new users.
    pub verification_url_base: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 8,
            verification_ttl_secs: 86_400,
            otp_ttl_secs: 300,
            otp_length: 6,
            host_request_queue: "adminQueue".into(),
            verification_url_base: "http://localhost:3000/verify-email".into(),
        }
    }
}

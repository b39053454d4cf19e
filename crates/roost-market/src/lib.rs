//! Roost Market: booking ledger, property registry, review rating
//! aggregation, guest-to-host role escalation and account verification.

pub mod account;
pub mod booking;
pub mod config;
pub mod error;
pub mod host_role;
pub mod property;
pub mod review;
pub mod token;

pub use account::AccountService;
pub use booking::BookingLedger;
pub use config::MarketConfig;
pub use error::MarketError;
pub use host_role::RoleEscalation;
pub use property::PropertyRegistry;
pub use review::ReviewAggregator;

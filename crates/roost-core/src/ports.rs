//! Collaborator interfaces consumed by the marketplace services.
//!
//! Failures from these collaborators surface as
//! [`RoostError::ExternalService`](crate::error::RoostError::ExternalService).

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RoostResult;

/// Key-value store with per-key expiry.
///
/// A lookup after expiry behaves exactly like a lookup of a key that was
/// never set.
pub trait TokenStore: Send + Sync {
    /// Set `key` to `value`, replacing any previous value and expiry.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = RoostResult<()>> + Send;
    fn get(&self, key: &str) -> impl Future<Output = RoostResult<Option<String>>> + Send;
    fn delete(&self, key: &str) -> impl Future<Output = RoostResult<()>> + Send;
    /// Physically remove expired entries. Returns the number removed.
    fn purge_expired(&self) -> impl Future<Output = RoostResult<u64>> + Send;
}

/// A message delivered from a [`WorkQueue`], not yet acknowledged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub id: Uuid,
    pub queue: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

/// Durable at-least-once message channel.
///
/// Fetched messages stay on the queue until acknowledged, so a consumer
/// that crashes between `fetch_batch` and `ack` sees them again.
pub trait WorkQueue: Send + Sync {
    fn publish(
        &self,
        queue: &str,
        payload: serde_json::Value,
    ) -> impl Future<Output = RoostResult<()>> + Send;
    /// All unacknowledged messages on `queue`, in enqueue order.
    fn fetch_batch(
        &self,
        queue: &str,
    ) -> impl Future<Output = RoostResult<Vec<QueuedMessage>>> + Send;
    /// Acknowledge (remove) the given messages. Unknown ids are ignored.
    fn ack(&self, queue: &str, ids: &[Uuid]) -> impl Future<Output = RoostResult<()>> + Send;
}

/// A file received by the upload layer and staged locally.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Image storage returning publicly reachable URLs.
pub trait ObjectStorage: Send + Sync {
    fn store(&self, file: &LocalFile) -> impl Future<Output = RoostResult<String>> + Send;
}

/// Content of an outbound verification message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationMessage {
    /// Link completing e-mail verification.
    EmailVerification { link: String },
    /// One-time passcode.
    OneTimePasscode { code: String, expires_in_secs: u64 },
}

/// Outbound notification channel (e-mail, SMS, ...).
pub trait Notifier: Send + Sync {
    fn send_verification_message(
        &self,
        destination: &str,
        message: VerificationMessage,
    ) -> impl Future<Output = RoostResult<()>> + Send;
}

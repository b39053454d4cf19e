//! Guest-to-host role escalation.
//!
//! Requests are persisted as [`HostRequest`] records, which are the
//! system of record. Each request also publishes a
//! [`PendingHostRequest`] notification onto the durable work queue for
//! an administrative consumer to drain.

use std::collections::HashSet;

use chrono::Utc;
use roost_core::error::{RoostError, RoostResult};
use roost_core::models::host_request::{
    CreateHostRequest, HostRequest, HostRequestStatus, PendingHostRequest, RequestType,
};
use roost_core::models::user::{Role, UpdateUser, User};
use roost_core::ports::WorkQueue;
use roost_core::repository::{HostRequestRepository, UserRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MarketConfig;
use crate::error::MarketError;

pub struct RoleEscalation<U: UserRepository, H: HostRequestRepository, Q: WorkQueue> {
    user_repo: U,
    request_repo: H,
    queue: Q,
    config: MarketConfig,
}

impl<U: UserRepository, H: HostRequestRepository, Q: WorkQueue> RoleEscalation<U, H, Q> {
    pub fn new(user_repo: U, request_repo: H, queue: Q, config: MarketConfig) -> Self {
        Self {
            user_repo,
            request_repo,
            queue,
            config,
        }
    }

    /// Ask for the host role.
    ///
    /// Reuses the user's open request if one exists; the queue
    /// notification is published either way.
    pub async fn request_host_role(&self, user_id: Uuid) -> RoostResult<HostRequest> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if user.is_host() {
            return Err(RoostError::business_rule("user is already a host"));
        }

        let request = match self.request_repo.find_pending_by_user(user_id).await? {
            Some(existing) => existing,
            None => {
                self.request_repo
                    .create(CreateHostRequest {
                        user_id,
                        email: user.email.clone(),
                    })
                    .await?
            }
        };

        let message = PendingHostRequest {
            user_id,
            request_type: RequestType::HostRole,
            email: user.email,
            enqueued_at: Utc::now(),
        };
        let payload = serde_json::to_value(&message)
            .map_err(|e| MarketError::MalformedMessage(e.to_string()))?;
        self.queue
            .publish(&self.config.host_request_queue, payload)
            .await?;

        info!(user_id = %user_id, request_id = %request.id, "Host role requested");
        Ok(request)
    }

    /// Drain the queue of host-role notifications.
    ///
    /// Duplicates for the same user collapse to the earliest one and
    /// users who are already hosts are dropped. Messages are
    /// acknowledged only after the whole batch has been decoded, so a
    /// failure part-way leaves them for the next drain. Undecodable
    /// messages are acknowledged and discarded.
    pub async fn list_pending_host_requests(&self) -> RoostResult<Vec<PendingHostRequest>> {
        let queue = &self.config.host_request_queue;
        let batch = self.queue.fetch_batch(queue).await?;

        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        let mut handled = Vec::with_capacity(batch.len());

        for message in batch {
            handled.push(message.id);

            let request: PendingHostRequest = match serde_json::from_value(message.payload) {
                Ok(request) => request,
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "Discarding malformed host request");
                    continue;
                }
            };
            if !seen.insert(request.user_id) {
                continue;
            }

            match self.user_repo.get_by_id(request.user_id).await {
                Ok(user) if user.is_host() => continue,
                Ok(_) => pending.push(request),
                Err(RoostError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }

        self.queue.ack(queue, &handled).await?;
        info!(drained = handled.len(), pending = pending.len(), "Host request queue drained");
        Ok(pending)
    }

    /// Persisted open requests, oldest first. Does not touch the queue.
    pub async fn open_host_requests(&self) -> RoostResult<Vec<HostRequest>> {
        self.request_repo.list_pending().await
    }

    /// Grant the host role and close every open request of the user.
    /// Idempotent: approving an existing host only closes leftovers.
    pub async fn approve_host_request(
        &self,
        admin_id: Uuid,
        target_user_id: Uuid,
    ) -> RoostResult<User> {
        self.require_admin(admin_id).await?;

        let mut user = self.user_repo.get_by_id(target_user_id).await?;
        if !user.is_host() {
            let mut roles = user.roles.clone();
            roles.insert(Role::Host);
            user = self
                .user_repo
                .update(
                    target_user_id,
                    UpdateUser {
                        roles: Some(roles),
                        ..Default::default()
                    },
                )
                .await?;
            info!(user_id = %target_user_id, admin_id = %admin_id, "Host role granted");
        }

        let closed = self
            .request_repo
            .decide_pending(target_user_id, HostRequestStatus::Approved, admin_id)
            .await?;
        if !closed.is_empty() {
            debug!(user_id = %target_user_id, closed = closed.len(), "Host requests approved");
        }
        Ok(user)
    }

    /// Reject the user's open requests; returns the oldest.
    pub async fn reject_host_request(
        &self,
        admin_id: Uuid,
        target_user_id: Uuid,
    ) -> RoostResult<HostRequest> {
        self.require_admin(admin_id).await?;

        let request = self
            .request_repo
            .decide_pending(target_user_id, HostRequestStatus::Rejected, admin_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RoostError::NotFound {
                entity: "host_request".into(),
                id: format!("user_id={target_user_id}"),
            })?;

        info!(user_id = %target_user_id, admin_id = %admin_id, "Host request rejected");
        Ok(request)
    }

    async fn require_admin(&self, admin_id: Uuid) -> RoostResult<()> {
        match self.user_repo.get_by_id(admin_id).await {
            Ok(admin) if admin.is_admin() => Ok(()),
            Ok(_) | Err(RoostError::NotFound { .. }) => Err(RoostError::denied(
                "host requests can only be decided by an administrator",
            )),
            Err(e) => Err(e),
        }
    }
}

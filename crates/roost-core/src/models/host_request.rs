//! Host-role escalation requests.
//!
//! A [`HostRequest`] is the persisted record an administrator decides
//! on. A [`PendingHostRequest`] is the notification carried on the
//! durable work queue; it may be delivered more than once.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RoostError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HostRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl HostRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostRequestStatus::Pending => "Pending",
            HostRequestStatus::Approved => "Approved",
            HostRequestStatus::Rejected => "Rejected",
        }
    }
}

impl FromStr for HostRequestStatus {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(HostRequestStatus::Pending),
            "Approved" => Ok(HostRequestStatus::Approved),
            "Rejected" => Ok(HostRequestStatus::Rejected),
            other => Err(RoostError::validation(format!(
                "unknown host request status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub status: HostRequestStatus,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHostRequest {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    #[serde(rename = "hostRole")]
    HostRole,
}

/// Queue payload announcing a guest's request for the host role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingHostRequest {
    pub user_id: Uuid,
    pub request_type: RequestType,
    pub email: String,
    pub enqueued_at: DateTime<Utc>,
}

//! SurrealDB implementation of [`HostRequestRepository`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use roost_core::error::RoostResult;
use roost_core::models::host_request::{CreateHostRequest, HostRequest, HostRequestStatus};
use roost_core::repository::HostRequestRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct HostRequestRow {
    user_id: String,
    email: String,
    status: String,
    requested_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct HostRequestRowWithId {
    record_id: String,
    user_id: String,
    email: String,
    status: String,
    requested_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
}

impl HostRequestRow {
    fn into_request(self, id: Uuid) -> Result<HostRequest, DbError> {
        let decided_by = self
            .decided_by
            .as_deref()
            .map(|raw| parse_uuid("host_request", "decided_by", raw))
            .transpose()?;
        Ok(HostRequest {
            id,
            user_id: parse_uuid("host_request", "user", &self.user_id)?,
            email: self.email,
            status: HostRequestStatus::from_str(&self.status)
                .map_err(|e| DbError::decode("host_request", e))?,
            requested_at: self.requested_at,
            decided_at: self.decided_at,
            decided_by,
        })
    }
}

impl HostRequestRowWithId {
    fn try_into_request(self) -> Result<HostRequest, DbError> {
        let id = parse_uuid("host_request", "record", &self.record_id)?;
        HostRequestRow {
            user_id: self.user_id,
            email: self.email,
            status: self.status,
            requested_at: self.requested_at,
            decided_at: self.decided_at,
            decided_by: self.decided_by,
        }
        .into_request(id)
    }
}

/// SurrealDB implementation of the HostRequest repository.
#[derive(Clone)]
pub struct SurrealHostRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealHostRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> HostRequestRepository for SurrealHostRequestRepository<C> {
    async fn create(&self, input: CreateHostRequest) -> RoostResult<HostRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('host_request', $id) SET \
                 user_id = $user_id, email = $email, \
                 status = 'Pending', \
                 decided_at = NONE, decided_by = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("email", input.email))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<HostRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "host_request".into(),
            id: id_str,
        })?;

        Ok(row.into_request(id)?)
    }

    async fn find_pending_by_user(&self, user_id: Uuid) -> RoostResult<Option<HostRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM host_request \
                 WHERE user_id = $user_id AND status = 'Pending' \
                 ORDER BY requested_at ASC LIMIT 1",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HostRequestRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.try_into_request())
            .transpose()?)
    }

    async fn list_pending(&self) -> RoostResult<Vec<HostRequest>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM host_request \
                 WHERE status = 'Pending' ORDER BY requested_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HostRequestRowWithId> = result.take(0).map_err(DbError::from)?;
        let requests = rows
            .into_iter()
            .map(|row| row.try_into_request())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(requests)
    }

    async fn decide_pending(
        &self,
        user_id: Uuid,
        status: HostRequestStatus,
        decided_by: Uuid,
    ) -> RoostResult<Vec<HostRequest>> {
        let decided_at = Utc::now();

        let mut result = self
            .db
            .query(
                "UPDATE host_request SET \
                 status = $status, decided_at = $decided_at, \
                 decided_by = $decided_by \
                 WHERE user_id = $user_id AND status = 'Pending'; \
                 SELECT meta::id(id) AS record_id, * FROM host_request \
                 WHERE user_id = $user_id AND decided_by = $decided_by \
                 AND decided_at = $decided_at \
                 ORDER BY requested_at ASC;",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .bind(("decided_at", decided_at))
            .bind(("decided_by", decided_by.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<HostRequestRowWithId> = result.take(1).map_err(DbError::from)?;
        let requests = rows
            .into_iter()
            .map(|row| row.try_into_request())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(requests)
    }
}

//! SurrealDB-backed durable [`WorkQueue`].
//!
//! Messages live in the `queue_message` table until acknowledged, which
//! gives at-least-once delivery to consumers that fetch, process and
//! then ack.

use chrono::{DateTime, Utc};
use roost_core::error::RoostResult;
use roost_core::ports::{QueuedMessage, WorkQueue};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

const SERVICE: &str = "work_queue";

#[derive(Debug, SurrealValue)]
struct MessageRowWithId {
    record_id: String,
    queue: String,
    payload: serde_json::Value,
    enqueued_at: DateTime<Utc>,
}

impl MessageRowWithId {
    fn try_into_message(self) -> Result<QueuedMessage, DbError> {
        Ok(QueuedMessage {
            id: parse_uuid("queue_message", "record", &self.record_id)?,
            queue: self.queue,
            payload: self.payload,
            enqueued_at: self.enqueued_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealWorkQueue<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkQueue<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WorkQueue for SurrealWorkQueue<C> {
    async fn publish(&self, queue: &str, payload: serde_json::Value) -> RoostResult<()> {
        let id = Uuid::new_v4();

        self.db
            .query(
                "CREATE type::record('queue_message', $id) SET \
                 queue = $queue, payload = $payload, enqueued_at = $enqueued_at",
            )
            .bind(("id", id.to_string()))
            .bind(("queue", queue.to_string()))
            .bind(("payload", payload))
            .bind(("enqueued_at", Utc::now()))
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?
            .check()
            .map_err(|e| DbError::Query(e.to_string()).into_external(SERVICE))?;

        debug!(queue, message_id = %id, "Message published");
        Ok(())
    }

    async fn fetch_batch(&self, queue: &str) -> RoostResult<Vec<QueuedMessage>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM queue_message \
                 WHERE queue = $queue ORDER BY enqueued_at ASC",
            )
            .bind(("queue", queue.to_string()))
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?;

        let rows: Vec<MessageRowWithId> = result
            .take(0)
            .map_err(|e| DbError::from(e).into_external(SERVICE))?;

        rows.into_iter()
            .map(|row| row.try_into_message().map_err(|e| e.into_external(SERVICE)))
            .collect()
    }

    async fn ack(&self, queue: &str, ids: &[Uuid]) -> RoostResult<()> {
        for id in ids {
            self.db
                .query("DELETE type::record('queue_message', $id) WHERE queue = $queue")
                .bind(("id", id.to_string()))
                .bind(("queue", queue.to_string()))
                .await
                .map_err(|e| DbError::from(e).into_external(SERVICE))?
                .check()
                .map_err(|e| DbError::Query(e.to_string()).into_external(SERVICE))?;
        }

        debug!(queue, count = ids.len(), "Messages acknowledged");
        Ok(())
    }
}

//! SurrealDB-backed [`TokenStore`].
//!
//! Each entry is an `ephemeral_token` record keyed by the token key.
//! Expired entries stay on disk until [`TokenStore::purge_expired`]
//! removes them, but every read filters on `expires_at`, so they are
//! never observed.

use std::time::Duration;

use chrono::{DateTime, Utc};
use roost_core::error::{RoostError, RoostResult};
use roost_core::ports::TokenStore;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::repository::CountRow;

const SERVICE: &str = "token_store";

#[derive(Debug, SurrealValue)]
struct TokenRow {
    value: String,
    #[allow(dead_code)]
    expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SurrealTokenStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTokenStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TokenStore for SurrealTokenStore<C> {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> RoostResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| RoostError::validation(format!("token ttl out of range: {e}")))?;
        let expires_at = Utc::now() + ttl;

        self.db
            .query(
                "UPSERT type::record('ephemeral_token', $key) SET \
                 value = $value, expires_at = $expires_at",
            )
            .bind(("key", key.to_string()))
            .bind(("value", value.to_string()))
            .bind(("expires_at", expires_at))
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?
            .check()
            .map_err(|e| DbError::Query(e.to_string()).into_external(SERVICE))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> RoostResult<Option<String>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('ephemeral_token', $key) \
                 WHERE expires_at > time::now()",
            )
            .bind(("key", key.to_string()))
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?;

        let rows: Vec<TokenRow> = result
            .take(0)
            .map_err(|e| DbError::from(e).into_external(SERVICE))?;

        Ok(rows.into_iter().next().map(|row| row.value))
    }

    async fn delete(&self, key: &str) -> RoostResult<()> {
        self.db
            .query("DELETE type::record('ephemeral_token', $key)")
            .bind(("key", key.to_string()))
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?
            .check()
            .map_err(|e| DbError::Query(e.to_string()).into_external(SERVICE))?;

        Ok(())
    }

    async fn purge_expired(&self) -> RoostResult<u64> {
        // Count expired entries first, then delete.
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM ephemeral_token \
                 WHERE expires_at <= time::now() GROUP ALL",
            )
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?;
        let count_rows: Vec<CountRow> = count_result
            .take(0)
            .map_err(|e| DbError::from(e).into_external(SERVICE))?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query("DELETE ephemeral_token WHERE expires_at <= time::now()")
            .await
            .map_err(|e| DbError::from(e).into_external(SERVICE))?
            .check()
            .map_err(|e| DbError::Query(e.to_string()).into_external(SERVICE))?;

        Ok(total)
    }
}

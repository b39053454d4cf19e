//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. UUIDs, dates and decimal amounts are
//! stored as strings; enums are stored as strings with ASSERT
//! constraints.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD roles ON TABLE user TYPE array;
DEFINE FIELD roles.* ON TABLE user TYPE string \
    ASSERT $value IN ['Guest', 'Host', 'Admin'];
DEFINE FIELD verified ON TABLE user TYPE bool DEFAULT false;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Pending', 'Active', 'Blocked'];
DEFINE FIELD phone ON TABLE user TYPE option<string>;
DEFINE FIELD profile_picture ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Properties
-- =======================================================================
DEFINE TABLE property SCHEMAFULL;
DEFINE FIELD host_id ON TABLE property TYPE string;
DEFINE FIELD property_type ON TABLE property TYPE string \
    ASSERT $value IN ['House', 'Apartment', 'Villa'];
DEFINE FIELD address ON TABLE property TYPE string;
DEFINE FIELD city ON TABLE property TYPE string;
DEFINE FIELD country ON TABLE property TYPE string;
DEFINE FIELD latitude ON TABLE property TYPE float;
DEFINE FIELD longitude ON TABLE property TYPE float;
DEFINE FIELD price_per_night ON TABLE property TYPE string;
DEFINE FIELD amenities ON TABLE property TYPE array;
DEFINE FIELD amenities.* ON TABLE property TYPE string;
DEFINE FIELD bedrooms ON TABLE property TYPE int;
DEFINE FIELD bathrooms ON TABLE property TYPE int;
DEFINE FIELD images ON TABLE property TYPE array;
DEFINE FIELD images.* ON TABLE property TYPE string;
DEFINE FIELD is_available ON TABLE property TYPE bool DEFAULT true;
DEFINE FIELD max_guests ON TABLE property TYPE int ASSERT $value >= 1;
DEFINE FIELD average_rating ON TABLE property TYPE option<float>;
DEFINE FIELD created_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_property_host ON TABLE property COLUMNS host_id;
DEFINE INDEX idx_property_city ON TABLE property COLUMNS city;

-- =======================================================================
-- Bookings
-- =======================================================================
DEFINE TABLE booking SCHEMAFULL;
DEFINE FIELD property_id ON TABLE booking TYPE string;
DEFINE FIELD guest_id ON TABLE booking TYPE string;
DEFINE FIELD start_date ON TABLE booking TYPE string;
DEFINE FIELD end_date ON TABLE booking TYPE string;
DEFINE FIELD guest_count ON TABLE booking TYPE int ASSERT $value >= 1;
DEFINE FIELD total_price ON TABLE booking TYPE string;
DEFINE FIELD payment_method ON TABLE booking TYPE string \
    ASSERT $value IN ['CreditCard', 'Paypal', 'BankTransfer'];
DEFINE FIELD payment_status ON TABLE booking TYPE string \
    ASSERT $value IN ['Pending', 'Paid', 'Failed'];
DEFINE FIELD status ON TABLE booking TYPE string \
    ASSERT $value IN ['Pending', 'Confirmed', 'Completed', 'Canceled'];
DEFINE FIELD created_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE booking TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_booking_guest ON TABLE booking COLUMNS guest_id;
DEFINE INDEX idx_booking_guest_property ON TABLE booking \
    COLUMNS guest_id, property_id, status;

-- =======================================================================
-- Reviews (soft-deletable)
-- =======================================================================
DEFINE TABLE review SCHEMAFULL;
DEFINE FIELD property_id ON TABLE review TYPE string;
DEFINE FIELD guest_id ON TABLE review TYPE string;
DEFINE FIELD rating ON TABLE review TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD comment ON TABLE review TYPE string;
DEFINE FIELD is_deleted ON TABLE review TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE review TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_review_property ON TABLE review \
    COLUMNS property_id, is_deleted;

-- =======================================================================
-- Host role requests
-- =======================================================================
DEFINE TABLE host_request SCHEMAFULL;
DEFINE FIELD user_id ON TABLE host_request TYPE string;
DEFINE FIELD email ON TABLE host_request TYPE string;
DEFINE FIELD status ON TABLE host_request TYPE string \
    ASSERT $value IN ['Pending', 'Approved', 'Rejected'];
DEFINE FIELD requested_at ON TABLE host_request TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD decided_at ON TABLE host_request TYPE option<datetime>;
DEFINE FIELD decided_by ON TABLE host_request TYPE option<string>;
DEFINE INDEX idx_host_request_user ON TABLE host_request \
    COLUMNS user_id, status;

-- =======================================================================
-- Ephemeral tokens (OTP, e-mail verification); record key is the
-- token key
-- =======================================================================
DEFINE TABLE ephemeral_token SCHEMAFULL;
DEFINE FIELD value ON TABLE ephemeral_token TYPE string;
DEFINE FIELD expires_at ON TABLE ephemeral_token TYPE datetime;
DEFINE INDEX idx_ephemeral_token_expiry ON TABLE ephemeral_token \
    COLUMNS expires_at;

-- =======================================================================
-- Durable work queue
-- =======================================================================
DEFINE TABLE queue_message SCHEMAFULL;
DEFINE FIELD queue ON TABLE queue_message TYPE string;
DEFINE FIELD payload ON TABLE queue_message TYPE object FLEXIBLE;
DEFINE FIELD enqueued_at ON TABLE queue_message TYPE datetime;
DEFINE INDEX idx_queue_message_queue ON TABLE queue_message \
    COLUMNS queue, enqueued_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

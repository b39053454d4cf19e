//! SurrealDB implementation of [`BookingRepository`].

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use roost_core::error::RoostResult;
use roost_core::models::booking::{
    Booking, BookingStatus, CreateBooking, PaymentMethod, PaymentStatus,
};
use roost_core::repository::BookingRepository;
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::{DbError, parse_uuid};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct BookingRow {
    property_id: String,
    guest_id: String,
    start_date: String,
    end_date: String,
    guest_count: u32,
    total_price: String,
    payment_method: String,
    payment_status: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct BookingRowWithId {
    record_id: String,
    property_id: String,
    guest_id: String,
    start_date: String,
    end_date: String,
    guest_count: u32,
    total_price: String,
    payment_method: String,
    payment_status: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| DbError::decode("booking", format!("invalid {field}: {e}")))
}

impl BookingRow {
    fn into_booking(self, id: Uuid) -> Result<Booking, DbError> {
        Ok(Booking {
            id,
            property_id: parse_uuid("booking", "property", &self.property_id)?,
            guest_id: parse_uuid("booking", "guest", &self.guest_id)?,
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
            guest_count: self.guest_count,
            total_price: Decimal::from_str(&self.total_price)
                .map_err(|e| DbError::decode("booking", format!("invalid total: {e}")))?,
            payment_method: PaymentMethod::from_str(&self.payment_method)
                .map_err(|e| DbError::decode("booking", e))?,
            payment_status: PaymentStatus::from_str(&self.payment_status)
                .map_err(|e| DbError::decode("booking", e))?,
            status: BookingStatus::from_str(&self.status)
                .map_err(|e| DbError::decode("booking", e))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl BookingRowWithId {
    fn try_into_booking(self) -> Result<Booking, DbError> {
        let id = parse_uuid("booking", "record", &self.record_id)?;
        BookingRow {
            property_id: self.property_id,
            guest_id: self.guest_id,
            start_date: self.start_date,
            end_date: self.end_date,
            guest_count: self.guest_count,
            total_price: self.total_price,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_booking(id)
    }
}

/// SurrealDB implementation of the Booking repository.
#[derive(Clone)]
pub struct SurrealBookingRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBookingRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Set a single string column and return the updated booking.
    async fn set_field(&self, id: Uuid, field: &'static str, value: &str) -> RoostResult<Booking> {
        let id_str = id.to_string();
        let query = format!(
            "UPDATE type::record('booking', $id) SET \
             {field} = $value, updated_at = time::now()"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }
}

impl<C: Connection> BookingRepository for SurrealBookingRepository<C> {
    async fn create(&self, input: CreateBooking) -> RoostResult<Booking> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('booking', $id) SET \
                 property_id = $property_id, \
                 guest_id = $guest_id, \
                 start_date = $start_date, end_date = $end_date, \
                 guest_count = $guest_count, \
                 total_price = $total_price, \
                 payment_method = $payment_method, \
                 payment_status = 'Pending', \
                 status = 'Pending'",
            )
            .bind(("id", id_str.clone()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("guest_id", input.guest_id.to_string()))
            .bind(("start_date", input.start_date.format(DATE_FORMAT).to_string()))
            .bind(("end_date", input.end_date.format(DATE_FORMAT).to_string()))
            .bind(("guest_count", input.guest_count))
            .bind(("total_price", input.total_price.to_string()))
            .bind(("payment_method", input.payment_method.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RoostResult<Booking> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('booking', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "booking".into(),
            id: id_str,
        })?;

        Ok(row.into_booking(id)?)
    }

    async fn list_by_guest(&self, guest_id: Uuid) -> RoostResult<Vec<Booking>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM booking \
                 WHERE guest_id = $guest_id ORDER BY created_at ASC",
            )
            .bind(("guest_id", guest_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BookingRowWithId> = result.take(0).map_err(DbError::from)?;
        let mut bookings = rows
            .into_iter()
            .map(|row| row.try_into_booking())
            .collect::<Result<Vec<_>, DbError>>()?;

        // Tie-break on id so equal timestamps still list deterministically.
        bookings.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> RoostResult<Booking> {
        self.set_field(id, "status", status.as_str()).await
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> RoostResult<Booking> {
        self.set_field(id, "payment_status", status.as_str()).await
    }

    async fn has_completed_stay(&self, guest_id: Uuid, property_id: Uuid) -> RoostResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM booking \
                 WHERE guest_id = $guest_id AND property_id = $property_id \
                 AND status = 'Completed' GROUP ALL",
            )
            .bind(("guest_id", guest_id.to_string()))
            .bind(("property_id", property_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }
}

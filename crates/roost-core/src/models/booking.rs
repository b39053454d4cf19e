//! Booking domain model, pricing and status machine.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RoostError, RoostResult};
use crate::models::property::Property;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    CreditCard,
    /// Third-party wallet.
    Paypal,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CreditCard",
            PaymentMethod::Paypal => "Paypal",
            PaymentMethod::BankTransfer => "BankTransfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreditCard" => Ok(PaymentMethod::CreditCard),
            "Paypal" => Ok(PaymentMethod::Paypal),
            "BankTransfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(RoostError::validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
        }
    }

    /// `Pending -> Paid | Failed`; settled states are final.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

impl FromStr for PaymentStatus {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Paid" => Ok(PaymentStatus::Paid),
            "Failed" => Ok(PaymentStatus::Failed),
            other => Err(RoostError::validation(format!(
                "unknown payment status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Canceled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Completed",
            BookingStatus::Canceled => "Canceled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Canceled)
    }

    /// Forward path `Pending -> Confirmed -> Completed`, plus
    /// cancellation from either non-terminal state.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
                | (BookingStatus::Pending, BookingStatus::Canceled)
                | (BookingStatus::Confirmed, BookingStatus::Canceled)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Completed" => Ok(BookingStatus::Completed),
            "Canceled" => Ok(BookingStatus::Canceled),
            other => Err(RoostError::validation(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_count: u32,
    /// Fixed at creation; never recomputed.
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A booking together with its referenced property.
///
/// `property` is `None` when the property has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithProperty {
    pub booking: Booking,
    pub property: Option<Property>,
}

/// Guest-supplied booking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub property_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_count: u32,
    pub payment_method: PaymentMethod,
}

/// A validated, priced booking ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_count: u32,
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
}

impl CreateBooking {
    /// Validate `request` against `property` and price it.
    ///
    /// Availability is not checked here; the ledger treats an
    /// unavailable property as not found before calling this.
    pub fn quote(guest_id: Uuid, request: BookingRequest, property: &Property) -> RoostResult<Self> {
        let nights = nights_between(request.start_date, request.end_date);
        if nights <= 0 {
            return Err(RoostError::validation(format!(
                "end date {} must be after start date {}",
                request.end_date, request.start_date
            )));
        }
        if request.guest_count == 0 {
            return Err(RoostError::validation("guest count must be at least 1"));
        }
        if request.guest_count > property.max_guests {
            return Err(RoostError::validation(format!(
                "guest count {} exceeds property maximum of {}",
                request.guest_count, property.max_guests
            )));
        }

        Ok(Self {
            property_id: property.id,
            guest_id,
            start_date: request.start_date,
            end_date: request.end_date,
            guest_count: request.guest_count,
            total_price: total_price(property.price_per_night, nights, request.guest_count),
            payment_method: request.payment_method,
        })
    }
}

/// Whole nights between two dates (negative if `end` precedes `start`).
pub fn nights_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// `price_per_night × nights × guest_count`.
pub fn total_price(price_per_night: Decimal, nights: i64, guest_count: u32) -> Decimal {
    price_per_night * Decimal::from(nights) * Decimal::from(guest_count)
}

//! Shared fixtures for marketplace service integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use roost_core::error::{RoostError, RoostResult};
use roost_core::models::booking::{BookingStatus, CreateBooking, PaymentMethod};
use roost_core::models::property::{
    CreateProperty, Location, Property, PropertyFields, PropertyType,
};
use roost_core::models::user::{CreateUser, Role, UpdateUser, User};
use roost_core::ports::{LocalFile, Notifier, ObjectStorage, VerificationMessage};
use roost_core::repository::{BookingRepository, PropertyRepository, UserRepository};
use roost_db::repository::{
    SurrealBookingRepository, SurrealPropertyRepository, SurrealUserRepository,
};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

pub type TestDb = Surreal<Db>;

/// Spin up an in-memory DB with the schema applied.
pub async fn setup_db() -> TestDb {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    roost_db::run_migrations(&db).await.unwrap();
    db
}

pub async fn create_user(db: &TestDb, name: &str, roles: &[Role]) -> User {
    let repo = SurrealUserRepository::new(db.clone());
    let user = repo
        .create(CreateUser {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "correct horse battery".into(),
        })
        .await
        .unwrap();
    if roles.is_empty() {
        return user;
    }

    let mut set = user.roles.clone();
    for role in roles {
        set.insert(*role);
    }
    repo.update(
        user.id,
        UpdateUser {
            roles: Some(set),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

pub fn lisbon_fields(price: Decimal, max_guests: u32) -> PropertyFields {
    PropertyFields {
        property_type: PropertyType::Apartment,
        location: Location {
            address: "12 Rua das Flores".into(),
            city: "Lisbon".into(),
            country: "Portugal".into(),
            latitude: 38.7223,
            longitude: -9.1393,
        },
        price_per_night: price,
        amenities: vec!["wifi".into(), "kitchen".into()],
        bedrooms: 2,
        bathrooms: 1,
        max_guests,
    }
}

pub async fn create_property(db: &TestDb, host_id: Uuid, price: Decimal) -> Property {
    SurrealPropertyRepository::new(db.clone())
        .create(CreateProperty {
            host_id,
            fields: lisbon_fields(price, 4),
            images: Vec::new(),
        })
        .await
        .unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Record a stay that has already been completed.
pub async fn completed_stay(db: &TestDb, guest_id: Uuid, property_id: Uuid) {
    let repo = SurrealBookingRepository::new(db.clone());
    let booking = repo
        .create(CreateBooking {
            property_id,
            guest_id,
            start_date: date("2024-10-10"),
            end_date: date("2024-10-12"),
            guest_count: 1,
            total_price: Decimal::from(300),
            payment_method: PaymentMethod::BankTransfer,
        })
        .await
        .unwrap();
    repo.update_status(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    repo.update_status(booking.id, BookingStatus::Completed)
        .await
        .unwrap();
}

pub fn local_file(name: &str) -> LocalFile {
    LocalFile {
        path: format!("/tmp/uploads/{name}").into(),
        file_name: name.into(),
        content_type: Some("image/jpeg".into()),
    }
}

/// Object storage that records uploads and serves them from a fake CDN.
#[derive(Clone, Default)]
pub struct FakeStorage {
    pub uploaded: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

impl ObjectStorage for FakeStorage {
    async fn store(&self, file: &LocalFile) -> RoostResult<String> {
        if self.fail {
            return Err(RoostError::external("object_storage", "bucket unreachable"));
        }
        self.uploaded.lock().unwrap().push(file.file_name.clone());
        Ok(format!("https://cdn.test/{}", file.file_name))
    }
}

/// Notifier that records every message it is asked to send.
#[derive(Clone, Default)]
pub struct FakeNotifier {
    pub sent: Arc<Mutex<Vec<(String, VerificationMessage)>>>,
    pub fail: bool,
}

impl FakeNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last(&self) -> Option<(String, VerificationMessage)> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl Notifier for FakeNotifier {
    async fn send_verification_message(
        &self,
        destination: &str,
        message: VerificationMessage,
    ) -> RoostResult<()> {
        if self.fail {
            return Err(RoostError::external("mailer", "smtp connection refused"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), message));
        Ok(())
    }
}

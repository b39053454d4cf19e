//! Integration tests for the booking ledger.

mod common;

use common::{create_property, create_user, date, setup_db};
use roost_core::error::RoostError;
use roost_core::models::booking::{BookingRequest, BookingStatus, PaymentMethod, PaymentStatus};
use roost_core::models::property::UpdateProperty;
use roost_core::models::user::Role;
use roost_core::repository::PropertyRepository;
use roost_db::repository::{SurrealBookingRepository, SurrealPropertyRepository};
use roost_market::BookingLedger;
use rust_decimal::Decimal;
use uuid::Uuid;

type Ledger = BookingLedger<
    SurrealBookingRepository<surrealdb::engine::local::Db>,
    SurrealPropertyRepository<surrealdb::engine::local::Db>,
>;

fn ledger(db: &common::TestDb) -> Ledger {
    BookingLedger::new(
        SurrealBookingRepository::new(db.clone()),
        SurrealPropertyRepository::new(db.clone()),
    )
}

fn request(property_id: Uuid, start: &str, end: &str, guests: u32) -> BookingRequest {
    BookingRequest {
        property_id,
        start_date: date(start),
        end_date: date(end),
        guest_count: guests,
        payment_method: PaymentMethod::CreditCard,
    }
}

#[tokio::test]
async fn five_nights_for_two_at_150_costs_1500() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(150)).await;
    let ledger = ledger(&db);

    let booking = ledger
        .create_booking(guest.id, request(property.id, "2024-10-10", "2024-10-15", 2))
        .await
        .unwrap();

    assert_eq!(booking.total_price, Decimal::from(1500));
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.payment_status, PaymentStatus::Pending);
    assert_eq!(booking.guest_id, guest.id);
}

#[tokio::test]
async fn total_price_is_fixed_at_creation() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(100)).await;
    let ledger = ledger(&db);

    let booking = ledger
        .create_booking(guest.id, request(property.id, "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap();

    SurrealPropertyRepository::new(db.clone())
        .update(
            property.id,
            UpdateProperty {
                price_per_night: Some(Decimal::from(999)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let fetched = ledger.get_booking(booking.id).await.unwrap();
    assert_eq!(fetched.booking.total_price, Decimal::from(200));
    assert_eq!(
        fetched.property.unwrap().price_per_night,
        Decimal::from(999)
    );
}

#[tokio::test]
async fn unavailable_or_missing_property_is_not_found() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(100)).await;
    SurrealPropertyRepository::new(db.clone())
        .update(
            property.id,
            UpdateProperty {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let ledger = ledger(&db);

    let err = ledger
        .create_booking(guest.id, request(property.id, "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::NotFound { .. }));

    let err = ledger
        .create_booking(guest.id, request(Uuid::new_v4(), "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::NotFound { .. }));
}

#[tokio::test]
async fn invalid_requests_are_validation_errors() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(100)).await;
    let ledger = ledger(&db);

    for bad in [
        request(property.id, "2024-10-10", "2024-10-10", 1),
        request(property.id, "2024-10-12", "2024-10-10", 1),
        request(property.id, "2024-10-10", "2024-10-12", 0),
        request(property.id, "2024-10-10", "2024-10-12", 5),
    ] {
        let err = ledger.create_booking(guest.id, bad).await.unwrap_err();
        assert!(matches!(err, RoostError::Validation { .. }), "got {err:?}");
    }
}

#[tokio::test]
async fn only_the_booking_guest_can_cancel() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let stranger = create_user(&db, "Sam", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(100)).await;
    let ledger = ledger(&db);

    let booking = ledger
        .create_booking(guest.id, request(property.id, "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap();

    let err = ledger
        .cancel_booking(booking.id, stranger.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::AuthorizationDenied { .. }));

    let canceled = ledger.cancel_booking(booking.id, guest.id).await.unwrap();
    assert_eq!(canceled.status, BookingStatus::Canceled);

    let err = ledger.cancel_booking(booking.id, guest.id).await.unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));

    let err = ledger
        .cancel_booking(Uuid::new_v4(), guest.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::NotFound { .. }));
}

#[tokio::test]
async fn completed_booking_cannot_be_canceled() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(100)).await;
    let ledger = ledger(&db);

    let booking = ledger
        .create_booking(guest.id, request(property.id, "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap();

    let err = ledger
        .transition_booking(booking.id, BookingStatus::Completed)
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));

    ledger
        .transition_booking(booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();
    ledger
        .transition_booking(booking.id, BookingStatus::Completed)
        .await
        .unwrap();

    let err = ledger.cancel_booking(booking.id, guest.id).await.unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));
}

#[tokio::test]
async fn payment_status_moves_once() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let property = create_property(&db, host.id, Decimal::from(100)).await;
    let ledger = ledger(&db);

    let booking = ledger
        .create_booking(guest.id, request(property.id, "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap();

    let paid = ledger
        .record_payment(booking.id, PaymentStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    let err = ledger
        .record_payment(booking.id, PaymentStatus::Failed)
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));
}

#[tokio::test]
async fn listing_survives_property_deletion() {
    let db = setup_db().await;
    let host = create_user(&db, "Hana", &[Role::Host]).await;
    let guest = create_user(&db, "Gil", &[]).await;
    let kept = create_property(&db, host.id, Decimal::from(100)).await;
    let doomed = create_property(&db, host.id, Decimal::from(80)).await;
    let ledger = ledger(&db);

    ledger
        .create_booking(guest.id, request(kept.id, "2024-10-10", "2024-10-12", 1))
        .await
        .unwrap();
    ledger
        .create_booking(guest.id, request(doomed.id, "2024-11-10", "2024-11-12", 1))
        .await
        .unwrap();
    SurrealPropertyRepository::new(db.clone())
        .delete(doomed.id)
        .await
        .unwrap();

    let listed = ledger.list_bookings_for_guest(guest.id).await.unwrap();
    assert_eq!(listed.len(), 2);

    let orphaned: Vec<_> = listed.iter().filter(|b| b.property.is_none()).collect();
    assert_eq!(orphaned.len(), 1);
    assert_eq!(orphaned[0].booking.property_id, doomed.id);

    assert!(ledger.list_bookings_for_guest(host.id).await.unwrap().is_empty());
}

//! Booking ledger: pricing, creation, cancellation and status
//! transitions.

use roost_core::error::{RoostError, RoostResult};
use roost_core::models::booking::{
    Booking, BookingRequest, BookingStatus, BookingWithProperty, CreateBooking, PaymentStatus,
};
use roost_core::models::property::Property;
use roost_core::repository::{BookingRepository, PropertyRepository};
use tracing::info;
use uuid::Uuid;

/// Booking ledger.
///
/// Reads property state through `P` and owns bookings through `B`.
pub struct BookingLedger<B: BookingRepository, P: PropertyRepository> {
    booking_repo: B,
    property_repo: P,
}

impl<B: BookingRepository, P: PropertyRepository> BookingLedger<B, P> {
    pub fn new(booking_repo: B, property_repo: P) -> Self {
        Self {
            booking_repo,
            property_repo,
        }
    }

    /// Price and persist a pending booking.
    ///
    /// An unavailable property is reported as not found.
    pub async fn create_booking(
        &self,
        guest_id: Uuid,
        request: BookingRequest,
    ) -> RoostResult<Booking> {
        let property = self.property_repo.get_by_id(request.property_id).await?;
        if !property.is_available {
            return Err(RoostError::not_found("property", property.id));
        }

        let input = CreateBooking::quote(guest_id, request, &property)?;
        let booking = self.booking_repo.create(input).await?;

        info!(
            booking_id = %booking.id,
            property_id = %booking.property_id,
            guest_id = %guest_id,
            total_price = %booking.total_price,
            "Booking created"
        );
        Ok(booking)
    }

    /// A guest's bookings, oldest first, each with its property if it
    /// still exists.
    pub async fn list_bookings_for_guest(
        &self,
        guest_id: Uuid,
    ) -> RoostResult<Vec<BookingWithProperty>> {
        let bookings = self.booking_repo.list_by_guest(guest_id).await?;

        let mut resolved = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let property = self.resolve_property(booking.property_id).await?;
            resolved.push(BookingWithProperty { booking, property });
        }
        Ok(resolved)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> RoostResult<BookingWithProperty> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        let property = self.resolve_property(booking.property_id).await?;
        Ok(BookingWithProperty { booking, property })
    }

    /// Cancel a booking on behalf of the guest who made it.
    ///
    /// Availability is not restored and no refund is recorded.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        requesting_guest_id: Uuid,
    ) -> RoostResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        if booking.guest_id != requesting_guest_id {
            return Err(RoostError::denied(
                "only the guest who made a booking can cancel it",
            ));
        }
        if booking.status.is_terminal() {
            return Err(RoostError::business_rule(format!(
                "booking is already {}",
                booking.status.as_str().to_lowercase()
            )));
        }

        let canceled = self
            .booking_repo
            .update_status(booking_id, BookingStatus::Canceled)
            .await?;
        info!(booking_id = %booking_id, guest_id = %requesting_guest_id, "Booking canceled");
        Ok(canceled)
    }

    /// Move a booking along its lifecycle (confirm, complete, cancel).
    pub async fn transition_booking(
        &self,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> RoostResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        if !booking.status.can_transition_to(next) {
            return Err(RoostError::business_rule(format!(
                "cannot move booking from {} to {}",
                booking.status.as_str(),
                next.as_str()
            )));
        }

        let updated = self.booking_repo.update_status(booking_id, next).await?;
        info!(
            booking_id = %booking_id,
            from = booking.status.as_str(),
            to = next.as_str(),
            "Booking status changed"
        );
        Ok(updated)
    }

    /// Record the outcome of an external payment.
    pub async fn record_payment(
        &self,
        booking_id: Uuid,
        status: PaymentStatus,
    ) -> RoostResult<Booking> {
        let booking = self.booking_repo.get_by_id(booking_id).await?;
        if !booking.payment_status.can_transition_to(status) {
            return Err(RoostError::business_rule(format!(
                "cannot move payment from {} to {}",
                booking.payment_status.as_str(),
                status.as_str()
            )));
        }

        let updated = self
            .booking_repo
            .update_payment_status(booking_id, status)
            .await?;
        info!(booking_id = %booking_id, payment_status = status.as_str(), "Payment recorded");
        Ok(updated)
    }

    /// `None` when the property has been deleted since booking.
    async fn resolve_property(&self, property_id: Uuid) -> RoostResult<Option<Property>> {
        match self.property_repo.get_by_id(property_id).await {
            Ok(property) => Ok(Some(property)),
            Err(RoostError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

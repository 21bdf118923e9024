//! The booking workflow: tenant request, landlord decision, tenant cancellation.

use super::access::Actor;
use super::error::{ServiceError, ServiceResult};
use crate::models::{
    Booking, BookingRequest, BookingStatus, BookingStatusUpdate, NewBooking, Property, UserRole,
};
use crate::storage::{RecordScope, StorageBackend};
use std::sync::Arc;
use tracing::info;

/// The rows a caller may list, derived from their role.
pub fn scope_for(actor: Actor) -> RecordScope {
    match actor.role {
        UserRole::Admin => RecordScope::All,
        UserRole::Landlord => RecordScope::Landlord(actor.user_id),
        UserRole::Tenant => RecordScope::Tenant(actor.user_id),
    }
}

#[derive(Clone)]
pub struct BookingService {
    storage: Arc<dyn StorageBackend>,
}

impl BookingService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn request(&self, actor: Actor, request: BookingRequest) -> ServiceResult<Booking> {
        actor.require_role(&[UserRole::Tenant])?;
        let property_id = request
            .property_id
            .ok_or_else(|| ServiceError::validation("Missing required field: property_id"))?;

        let property = self.property(property_id).await?;
        if !property.available {
            return Err(ServiceError::validation(
                "Property is not available for booking",
            ));
        }
        if self
            .storage
            .find_open_booking(actor.user_id, property_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "You already have an active booking for this property".to_string(),
            ));
        }

        let booking = self
            .storage
            .create_booking(NewBooking {
                tenant_id: actor.user_id,
                property_id,
                message: request.message.filter(|m| !m.trim().is_empty()),
            })
            .await?;
        info!(
            "Tenant {} requested booking {} for property {}",
            actor.user_id, booking.id, property_id
        );
        Ok(booking)
    }

    pub async fn list(&self, actor: Actor) -> ServiceResult<Vec<Booking>> {
        Ok(self.storage.list_bookings(scope_for(actor)).await?)
    }

    pub async fn get(&self, actor: Actor, id: i64) -> ServiceResult<Booking> {
        let booking = self.booking(id).await?;
        let property = self.property(booking.property_id).await?;
        if actor.is_admin()
            || booking.tenant_id == actor.user_id
            || property.landlord_id == actor.user_id
        {
            Ok(booking)
        } else {
            Err(ServiceError::forbidden("Access denied"))
        }
    }

    /// Apply a status change on behalf of the property owner, an admin, or
    /// the tenant who made the booking.
    pub async fn update_status(
        &self,
        actor: Actor,
        id: i64,
        update: BookingStatusUpdate,
    ) -> ServiceResult<Booking> {
        let next: BookingStatus = update
            .status
            .as_deref()
            .ok_or_else(|| ServiceError::validation("Missing required field: status"))?
            .parse()
            .map_err(|_| {
                ServiceError::validation(
                    "Invalid status. Must be one of: approved, rejected, cancelled",
                )
            })?;

        let booking = self.booking(id).await?;
        let property = self.property(booking.property_id).await?;
        let current = booking.status;

        let decides = actor.is_admin() || property.landlord_id == actor.user_id;
        let owns_booking = booking.tenant_id == actor.user_id;

        let property_available = if decides && current.can_decide(next) {
            if next == BookingStatus::Approved && !property.available {
                return Err(ServiceError::validation(
                    "Property is no longer available for booking",
                ));
            }
            (next == BookingStatus::Approved).then_some(false)
        } else if owns_booking && next == BookingStatus::Cancelled && current.can_cancel() {
            (current == BookingStatus::Approved).then_some(true)
        } else if decides || owns_booking {
            return Err(ServiceError::validation(format!(
                "Cannot change booking from {} to {}",
                current, next
            )));
        } else {
            return Err(ServiceError::forbidden("Access denied"));
        };

        let response = update.response.filter(|r| !r.trim().is_empty());
        let updated = self
            .storage
            .update_booking_status(id, current, next, response, property_available)
            .await?;
        info!(
            "Booking {} moved from {} to {} by user {}",
            id, current, next, actor.user_id
        );
        Ok(updated)
    }

    async fn booking(&self, id: i64) -> ServiceResult<Booking> {
        self.storage
            .get_booking(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking not found"))
    }

    async fn property(&self, id: i64) -> ServiceResult<Property> {
        self.storage
            .get_property(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))
    }
}

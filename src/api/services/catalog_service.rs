//! Add-on services and tenants' requests for them.

use super::access::Actor;
use super::booking_service::scope_for;
use super::error::{ServiceError, ServiceResult};
use crate::models::{
    NewService, NewServiceBooking, Service, ServiceBooking, ServiceBookingRequest,
    ServiceBookingStatus, ServiceBookingStatusUpdate, ServiceChanges, ServiceDraft, UserRole,
};
use crate::storage::{StorageBackend, StorageError};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct CatalogService {
    storage: Arc<dyn StorageBackend>,
}

impl CatalogService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Inactive services are only listed for admins.
    pub async fn list(&self, actor: Option<Actor>) -> ServiceResult<Vec<Service>> {
        let active_only = !actor.is_some_and(|a| a.is_admin());
        Ok(self.storage.list_services(active_only).await?)
    }

    pub async fn create(&self, actor: Actor, draft: ServiceDraft) -> ServiceResult<Service> {
        actor.require_role(&[UserRole::Admin])?;
        let name = draft
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServiceError::validation("Missing required field: name"))?;
        let rate = draft
            .rate
            .ok_or_else(|| ServiceError::validation("Missing required field: rate"))?;
        if rate < 0.0 {
            return Err(ServiceError::validation("Rate must not be negative"));
        }

        let service = self
            .storage
            .create_service(NewService {
                name,
                description: draft.description,
                rate,
                is_active: draft.is_active.unwrap_or(true),
            })
            .await?;
        info!("Service {} ({}) created", service.id, service.name);
        Ok(service)
    }

    pub async fn update(
        &self,
        actor: Actor,
        id: i64,
        changes: ServiceChanges,
    ) -> ServiceResult<Service> {
        actor.require_role(&[UserRole::Admin])?;
        if changes.rate.is_some_and(|rate| rate < 0.0) {
            return Err(ServiceError::validation("Rate must not be negative"));
        }
        if changes.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ServiceError::validation("name cannot be empty"));
        }
        let mut service = self.service(id).await?;
        changes.apply(&mut service);
        Ok(self.storage.update_service(service).await?)
    }

    pub async fn delete(&self, actor: Actor, id: i64) -> ServiceResult<()> {
        actor.require_role(&[UserRole::Admin])?;
        self.storage.delete_service(id).await.map_err(|e| match e {
            StorageError::NotFound { .. } => ServiceError::not_found("Service not found"),
            other => other.into(),
        })?;
        info!("Service {} deleted", id);
        Ok(())
    }

    pub async fn request(
        &self,
        actor: Actor,
        request: ServiceBookingRequest,
    ) -> ServiceResult<ServiceBooking> {
        actor.require_role(&[UserRole::Tenant])?;
        let service_id = request
            .service_id
            .ok_or_else(|| ServiceError::validation("Missing required field: service_id"))?;
        let property_id = request
            .property_id
            .ok_or_else(|| ServiceError::validation("Missing required field: property_id"))?;
        let requested_date = request
            .requested_date
            .ok_or_else(|| ServiceError::validation("Missing required field: requested_date"))?;

        let service = self.service(service_id).await?;
        if !service.is_active {
            return Err(ServiceError::validation("Service is not currently offered"));
        }
        if self.storage.get_property(property_id).await?.is_none() {
            return Err(ServiceError::not_found("Property not found"));
        }

        let booking = self
            .storage
            .create_service_booking(NewServiceBooking {
                tenant_id: actor.user_id,
                property_id,
                service_id,
                requested_date,
                notes: request.notes,
            })
            .await?;
        info!(
            "Tenant {} requested service {} for property {}",
            actor.user_id, service_id, property_id
        );
        Ok(booking)
    }

    pub async fn list_requests(&self, actor: Actor) -> ServiceResult<Vec<ServiceBooking>> {
        Ok(self.storage.list_service_bookings(scope_for(actor)).await?)
    }

    pub async fn update_request(
        &self,
        actor: Actor,
        id: i64,
        update: ServiceBookingStatusUpdate,
    ) -> ServiceResult<ServiceBooking> {
        let next: ServiceBookingStatus = update
            .status
            .as_deref()
            .ok_or_else(|| ServiceError::validation("Missing required field: status"))?
            .parse()
            .map_err(|e| ServiceError::validation(format!("Invalid status: {}", e)))?;

        let booking = self
            .storage
            .get_service_booking(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service booking not found"))?;
        let property = self
            .storage
            .get_property(booking.property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))?;
        actor.require_owner_or_admin(property.landlord_id, "Access denied")?;

        if !booking.status.can_transition_to(next) {
            return Err(ServiceError::validation(format!(
                "Cannot change service booking from {} to {}",
                booking.status, next
            )));
        }
        Ok(self
            .storage
            .update_service_booking_status(id, booking.status, next)
            .await?)
    }

    async fn service(&self, id: i64) -> ServiceResult<Service> {
        self.storage
            .get_service(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service not found"))
    }
}

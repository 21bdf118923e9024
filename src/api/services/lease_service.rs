//! Lease agreements between a landlord and a tenant for one property.

use super::access::Actor;
use super::booking_service::scope_for;
use super::error::{ServiceError, ServiceResult};
use crate::models::lease::months_between;
use crate::models::{Lease, LeaseRequest, LeaseStatus, LeaseStatusUpdate, NewLease, UserRole};
use crate::storage::StorageBackend;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

fn required<T>(value: Option<T>, field: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("Missing required field: {}", field)))
}

#[derive(Clone)]
pub struct LeaseService {
    storage: Arc<dyn StorageBackend>,
}

impl LeaseService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, actor: Actor, request: LeaseRequest) -> ServiceResult<Lease> {
        actor.require_role(&[UserRole::Landlord, UserRole::Admin])?;

        let property_id = required(request.property_id, "property_id")?;
        let tenant_id = required(request.tenant_id, "tenant_id")?;
        let monthly_rent = required(request.monthly_rent, "monthly_rent")?;
        let security_deposit = required(request.security_deposit, "security_deposit")?;
        let start_date = required(request.start_date, "start_date")?;
        let end_date = required(request.end_date, "end_date")?;

        if end_date <= start_date {
            return Err(ServiceError::validation("End date must be after start date"));
        }
        if monthly_rent < 0.0 || security_deposit < 0.0 || request.pet_deposit.unwrap_or(0.0) < 0.0
        {
            return Err(ServiceError::validation("Amounts must not be negative"));
        }

        let property = self
            .storage
            .get_property(property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))?;
        actor.require_owner_or_admin(
            property.landlord_id,
            "You can only create leases for your own properties",
        )?;

        let tenant = self
            .storage
            .get_user(tenant_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tenant not found"))?;
        if tenant.role != UserRole::Tenant {
            return Err(ServiceError::validation("Lease holder must be a tenant"));
        }

        let lease = self
            .storage
            .create_lease(NewLease {
                property_id,
                tenant_id,
                landlord_id: property.landlord_id,
                monthly_rent,
                security_deposit,
                start_date,
                end_date,
                lease_duration_months: months_between(start_date, end_date),
                pet_deposit: request.pet_deposit,
                utilities_included: request.utilities_included,
                parking_included: request.parking_included,
            })
            .await?;
        info!(
            "Lease {} created for tenant {} on property {}",
            lease.id, tenant_id, property_id
        );
        Ok(lease)
    }

    pub async fn list(&self, actor: Actor) -> ServiceResult<Vec<Lease>> {
        Ok(self.storage.list_leases(scope_for(actor)).await?)
    }

    pub async fn get(&self, actor: Actor, id: i64) -> ServiceResult<Lease> {
        let lease = self.lease(id).await?;
        if actor.is_admin()
            || lease.tenant_id == actor.user_id
            || lease.landlord_id == actor.user_id
        {
            Ok(lease)
        } else {
            Err(ServiceError::forbidden("Access denied"))
        }
    }

    pub async fn update_status(
        &self,
        actor: Actor,
        id: i64,
        update: LeaseStatusUpdate,
    ) -> ServiceResult<Lease> {
        actor.require_role(&[UserRole::Landlord, UserRole::Admin])?;
        let next: LeaseStatus = required(update.status, "status")?
            .parse()
            .map_err(|e| ServiceError::validation(format!("Invalid status: {}", e)))?;

        let mut lease = self.lease(id).await?;
        actor.require_owner_or_admin(lease.landlord_id, "Access denied")?;
        if !lease.status.can_transition_to(next) {
            return Err(ServiceError::validation(format!(
                "Cannot change lease from {} to {}",
                lease.status, next
            )));
        }

        let current = lease.status;
        let now = Utc::now();
        if next == LeaseStatus::Active {
            lease.signed_at = Some(now);
        }
        lease.status = next;
        lease.updated_at = now;
        let lease = self.storage.update_lease(lease, current).await?;
        info!("Lease {} is now {}", id, next);
        Ok(lease)
    }

    async fn lease(&self, id: i64) -> ServiceResult<Lease> {
        self.storage
            .get_lease(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lease not found"))
    }
}

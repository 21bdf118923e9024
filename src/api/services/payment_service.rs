//! Rent payment records.

use super::access::Actor;
use super::booking_service::scope_for;
use super::error::{ServiceError, ServiceResult};
use crate::models::{
    NewPayment, Payment, PaymentCompletion, PaymentMethod, PaymentRequest, PaymentStatus, UserRole,
};
use crate::storage::StorageBackend;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

const RECENT_LIMIT: usize = 10;

#[derive(Clone)]
pub struct PaymentService {
    storage: Arc<dyn StorageBackend>,
}

impl PaymentService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn record(&self, actor: Actor, request: PaymentRequest) -> ServiceResult<Payment> {
        actor.require_role(&[UserRole::Tenant])?;

        let property_id = request
            .property_id
            .ok_or_else(|| ServiceError::validation("Missing required field: property_id"))?;
        let amount = request
            .amount
            .ok_or_else(|| ServiceError::validation("Missing required field: amount"))?;
        if amount <= 0.0 {
            return Err(ServiceError::validation("Amount must be greater than zero"));
        }
        let method: PaymentMethod = match request.method.as_deref() {
            None => PaymentMethod::BankTransfer,
            Some(raw) => raw
                .parse()
                .map_err(|e| ServiceError::validation(format!("Invalid payment method: {}", e)))?,
        };

        if self.storage.get_property(property_id).await?.is_none() {
            return Err(ServiceError::not_found("Property not found"));
        }
        if let Some(lease_id) = request.lease_id {
            let lease = self
                .storage
                .get_lease(lease_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("Lease not found"))?;
            if lease.tenant_id != actor.user_id || lease.property_id != property_id {
                return Err(ServiceError::validation(
                    "Lease does not belong to this tenant and property",
                ));
            }
        }

        let payment = self
            .storage
            .create_payment(NewPayment {
                tenant_id: actor.user_id,
                property_id,
                lease_id: request.lease_id,
                amount,
                method,
                due_date: request.due_date,
                notes: request.notes,
            })
            .await?;
        info!(
            "Tenant {} recorded payment {} of {:.2}",
            actor.user_id, payment.id, payment.amount
        );
        Ok(payment)
    }

    pub async fn list(&self, actor: Actor) -> ServiceResult<Vec<Payment>> {
        Ok(self.storage.list_payments(scope_for(actor), None).await?)
    }

    pub async fn recent(&self, actor: Actor) -> ServiceResult<Vec<Payment>> {
        Ok(self
            .storage
            .list_payments(scope_for(actor), Some(RECENT_LIMIT))
            .await?)
    }

    /// Mark a pending payment received. Only the property's landlord or an
    /// admin may. Failed and refunded payments are settled by recording a new one.
    pub async fn complete(
        &self,
        actor: Actor,
        id: i64,
        completion: PaymentCompletion,
    ) -> ServiceResult<Payment> {
        actor.require_role(&[UserRole::Landlord, UserRole::Admin])?;
        let mut payment = self
            .storage
            .get_payment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Payment not found"))?;
        let property = self
            .storage
            .get_property(payment.property_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))?;
        actor.require_owner_or_admin(property.landlord_id, "Access denied")?;

        match payment.status {
            PaymentStatus::Pending => {}
            PaymentStatus::Completed => {
                return Err(ServiceError::validation("Payment is already completed"));
            }
            other => {
                return Err(ServiceError::validation(format!(
                    "Cannot complete a {} payment",
                    other
                )));
            }
        }

        let now = Utc::now();
        payment.status = PaymentStatus::Completed;
        payment.paid_date = Some(now.date_naive());
        if completion.transaction_id.is_some() {
            payment.transaction_id = completion.transaction_id;
        }
        if completion.reference_number.is_some() {
            payment.reference_number = completion.reference_number;
        }
        payment.updated_at = now;

        let payment = self
            .storage
            .update_payment(payment, PaymentStatus::Pending)
            .await?;
        info!("Payment {} completed by user {}", id, actor.user_id);
        Ok(payment)
    }
}

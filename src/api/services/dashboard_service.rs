//! Role dashboards and admin analytics, computed from the store on each request.

use super::access::Actor;
use super::error::ServiceResult;
use crate::models::{
    ApprovalStatus, Booking, BookingStatus, Lease, Payment, PaymentStatus, ServiceBookingStatus,
    UserResponse, UserRole,
};
use crate::storage::{PropertyQuery, RecordScope, StorageBackend};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use utoipa::ToSchema;

const RECENT_ITEMS: usize = 5;

/// Count items per label, listing every label in `all` even when zero.
fn tally<T: Display>(all: &[T], items: impl Iterator<Item = T>) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = all.iter().map(|v| (v.to_string(), 0)).collect();
    for item in items {
        *counts.entry(item.to_string()).or_default() += 1;
    }
    counts
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TenantDashboard {
    pub bookings_by_status: BTreeMap<String, usize>,
    pub recent_bookings: Vec<Booking>,
    pub active_leases: Vec<Lease>,
    pub pending_payments: Vec<Payment>,
    pub overdue_payments: usize,
    pub amount_due: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PropertyCounts {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LandlordDashboard {
    pub properties: PropertyCounts,
    pub pending_booking_requests: Vec<Booking>,
    pub active_leases: usize,
    pub monthly_rent_roll: f64,
    pub pending_service_requests: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStats {
    pub total_users: usize,
    pub total_properties: usize,
    pub total_bookings: usize,
    pub pending_approvals: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub system_stats: SystemStats,
    pub users_by_role: BTreeMap<String, usize>,
    pub recent_pending_users: Vec<UserResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentTotals {
    pub total: usize,
    pub completed: usize,
    pub amount_collected: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Analytics {
    pub users_by_role: BTreeMap<String, usize>,
    pub users_by_status: BTreeMap<String, usize>,
    pub properties: PropertyCounts,
    pub bookings_by_status: BTreeMap<String, usize>,
    pub service_requests_by_status: BTreeMap<String, usize>,
    pub payments: PaymentTotals,
}

#[derive(Clone)]
pub struct DashboardService {
    storage: Arc<dyn StorageBackend>,
}

impl DashboardService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    pub async fn tenant(&self, actor: Actor) -> ServiceResult<TenantDashboard> {
        actor.require_role(&[UserRole::Tenant])?;
        let today = Self::today();
        let scope = RecordScope::Tenant(actor.user_id);

        let bookings = self.storage.list_bookings(scope).await?;
        let leases = self.storage.list_leases(scope).await?;
        let payments = self.storage.list_payments(scope, None).await?;

        let pending_payments: Vec<Payment> = payments
            .into_iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .collect();

        Ok(TenantDashboard {
            bookings_by_status: tally(BookingStatus::all(), bookings.iter().map(|b| b.status)),
            recent_bookings: bookings.into_iter().take(RECENT_ITEMS).collect(),
            active_leases: leases.into_iter().filter(|l| l.is_active(today)).collect(),
            overdue_payments: pending_payments.iter().filter(|p| p.is_overdue(today)).count(),
            amount_due: pending_payments.iter().map(|p| p.amount).sum(),
            pending_payments,
        })
    }

    pub async fn landlord(&self, actor: Actor) -> ServiceResult<LandlordDashboard> {
        actor.require_role(&[UserRole::Landlord])?;
        let today = Self::today();
        let scope = RecordScope::Landlord(actor.user_id);

        let properties = self
            .storage
            .list_properties(&PropertyQuery {
                landlord_id: Some(actor.user_id),
                ..PropertyQuery::default()
            })
            .await?;
        let available = properties.iter().filter(|p| p.available).count();

        let pending_booking_requests: Vec<Booking> = self
            .storage
            .list_bookings(scope)
            .await?
            .into_iter()
            .filter(|b| b.status == BookingStatus::Pending)
            .collect();
        let active_leases: Vec<Lease> = self
            .storage
            .list_leases(scope)
            .await?
            .into_iter()
            .filter(|l| l.is_active(today))
            .collect();
        let pending_service_requests = self
            .storage
            .list_service_bookings(scope)
            .await?
            .iter()
            .filter(|s| s.status == ServiceBookingStatus::Pending)
            .count();

        Ok(LandlordDashboard {
            properties: PropertyCounts {
                total: properties.len(),
                available,
                occupied: properties.len() - available,
            },
            pending_booking_requests,
            active_leases: active_leases.len(),
            monthly_rent_roll: active_leases.iter().map(|l| l.monthly_rent).sum(),
            pending_service_requests,
        })
    }

    pub async fn admin(&self, actor: Actor) -> ServiceResult<AdminDashboard> {
        actor.require_role(&[UserRole::Admin])?;
        let users = self.storage.list_users().await?;
        let properties = self
            .storage
            .list_properties(&PropertyQuery::default())
            .await?;
        let bookings = self.storage.list_bookings(RecordScope::All).await?;

        let pending: Vec<UserResponse> = users
            .iter()
            .filter(|u| u.approval_status == ApprovalStatus::Pending)
            .map(UserResponse::from)
            .collect();

        Ok(AdminDashboard {
            system_stats: SystemStats {
                total_users: users.len(),
                total_properties: properties.len(),
                total_bookings: bookings.len(),
                pending_approvals: pending.len(),
            },
            users_by_role: tally(UserRole::all(), users.iter().map(|u| u.role)),
            recent_pending_users: pending.into_iter().take(RECENT_ITEMS).collect(),
        })
    }

    pub async fn analytics(&self, actor: Actor) -> ServiceResult<Analytics> {
        actor.require_role(&[UserRole::Admin])?;
        let users = self.storage.list_users().await?;
        let properties = self
            .storage
            .list_properties(&PropertyQuery::default())
            .await?;
        let bookings = self.storage.list_bookings(RecordScope::All).await?;
        let service_bookings = self.storage.list_service_bookings(RecordScope::All).await?;
        let payments = self.storage.list_payments(RecordScope::All, None).await?;

        let available = properties.iter().filter(|p| p.available).count();
        let completed: Vec<&Payment> = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .collect();

        Ok(Analytics {
            users_by_role: tally(UserRole::all(), users.iter().map(|u| u.role)),
            users_by_status: tally(
                ApprovalStatus::all(),
                users.iter().map(|u| u.approval_status),
            ),
            properties: PropertyCounts {
                total: properties.len(),
                available,
                occupied: properties.len() - available,
            },
            bookings_by_status: tally(BookingStatus::all(), bookings.iter().map(|b| b.status)),
            service_requests_by_status: tally(
                ServiceBookingStatus::all(),
                service_bookings.iter().map(|s| s.status),
            ),
            payments: PaymentTotals {
                total: payments.len(),
                completed: completed.len(),
                amount_collected: completed.iter().map(|p| p.amount).sum(),
            },
        })
    }
}

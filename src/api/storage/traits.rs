//! Storage trait definitions for the API storage backends.

use crate::models::{
    ApprovalStatus, Booking, BookingStatus, Lease, LeaseStatus, NewBooking, NewLease, NewPayment,
    NewProperty, NewService, NewServiceBooking, NewUser, Payment, PaymentStatus, Property, Service,
    ServiceBooking, ServiceBookingStatus, User,
};
use serde::{Deserialize, Serialize};

/// Which rows of a per-party table a caller may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordScope {
    /// Every row (admin).
    All,
    /// Rows where the caller is the tenant.
    Tenant(i64),
    /// Rows attached to a property the caller owns.
    Landlord(i64),
}

/// Listing filters. Every populated field must match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PropertyQuery {
    pub landlord_id: Option<i64>,
    pub available_only: bool,
    pub property_type: Option<String>,
    /// Case-insensitive substring of `location`.
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<i32>,
    pub has_gps: Option<bool>,
}

impl PropertyQuery {
    pub fn matches(&self, property: &Property) -> bool {
        let location_matches = match &self.location {
            Some(location) => property
                .location
                .to_lowercase()
                .contains(&location.to_lowercase()),
            None => true,
        };
        self.landlord_id.is_none_or(|id| property.landlord_id == id)
            && (!self.available_only || property.available)
            && self
                .property_type
                .as_ref()
                .is_none_or(|t| &property.property_type == t)
            && location_matches
            && self.min_price.is_none_or(|min| property.price >= min)
            && self.max_price.is_none_or(|max| property.price <= max)
            && self.min_bedrooms.is_none_or(|min| property.bedrooms >= min)
            && self
                .has_gps
                .is_none_or(|wanted| property.has_coordinates() == wanted)
    }
}

/// Outcome of removing an account and everything that hangs off it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserDeletion {
    pub properties_deleted: u64,
    pub bookings_deleted: u64,
}

/// Storage backend trait for database operations.
///
/// List methods return newest rows first.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    // Users

    /// Insert a user; duplicate username or email yields `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, super::StorageError>;

    async fn get_user(&self, id: i64) -> Result<Option<User>, super::StorageError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, super::StorageError>;

    async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, super::StorageError>;

    async fn list_users(&self) -> Result<Vec<User>, super::StorageError>;

    async fn set_approval_status(
        &self,
        id: i64,
        status: ApprovalStatus,
    ) -> Result<User, super::StorageError>;

    /// Delete a user together with their properties and every record that
    /// references either, in one transaction.
    async fn delete_user(&self, id: i64) -> Result<UserDeletion, super::StorageError>;

    // Properties

    async fn create_property(&self, property: NewProperty)
    -> Result<Property, super::StorageError>;

    async fn get_property(&self, id: i64) -> Result<Option<Property>, super::StorageError>;

    async fn list_properties(
        &self,
        query: &PropertyQuery,
    ) -> Result<Vec<Property>, super::StorageError>;

    /// Persist every field of an existing property.
    async fn update_property(&self, property: Property) -> Result<Property, super::StorageError>;

    /// Delete a property with its bookings, service bookings, payments and leases.
    async fn delete_property(&self, id: i64) -> Result<(), super::StorageError>;

    // Bookings

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, super::StorageError>;

    async fn get_booking(&self, id: i64) -> Result<Option<Booking>, super::StorageError>;

    async fn list_bookings(&self, scope: RecordScope)
    -> Result<Vec<Booking>, super::StorageError>;

    /// A pending or approved booking by `tenant_id` for `property_id`, if any.
    async fn find_open_booking(
        &self,
        tenant_id: i64,
        property_id: i64,
    ) -> Result<Option<Booking>, super::StorageError>;

    /// Change a booking's status and, when `property_available` is set, the
    /// booked property's availability in the same transaction.
    ///
    /// Fails with `StaleWrite` when the booking is no longer in `expected`.
    /// Taking a property off the market requires it to be available, else
    /// `StaleWrite` on the property. Putting it back is skipped while another
    /// approved booking for it remains.
    async fn update_booking_status(
        &self,
        id: i64,
        expected: BookingStatus,
        status: BookingStatus,
        landlord_response: Option<String>,
        property_available: Option<bool>,
    ) -> Result<Booking, super::StorageError>;

    // Payments

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, super::StorageError>;

    async fn get_payment(&self, id: i64) -> Result<Option<Payment>, super::StorageError>;

    /// At most `limit` payments when set.
    async fn list_payments(
        &self,
        scope: RecordScope,
        limit: Option<usize>,
    ) -> Result<Vec<Payment>, super::StorageError>;

    /// Persist a payment whose stored status is still `expected`.
    async fn update_payment(
        &self,
        payment: Payment,
        expected: PaymentStatus,
    ) -> Result<Payment, super::StorageError>;

    // Leases

    async fn create_lease(&self, lease: NewLease) -> Result<Lease, super::StorageError>;

    async fn get_lease(&self, id: i64) -> Result<Option<Lease>, super::StorageError>;

    async fn list_leases(&self, scope: RecordScope) -> Result<Vec<Lease>, super::StorageError>;

    /// Persist a lease whose stored status is still `expected`.
    async fn update_lease(
        &self,
        lease: Lease,
        expected: LeaseStatus,
    ) -> Result<Lease, super::StorageError>;

    // Services and service bookings

    async fn create_service(&self, service: NewService) -> Result<Service, super::StorageError>;

    async fn get_service(&self, id: i64) -> Result<Option<Service>, super::StorageError>;

    /// Services ordered by name.
    async fn list_services(&self, active_only: bool)
    -> Result<Vec<Service>, super::StorageError>;

    async fn update_service(&self, service: Service) -> Result<Service, super::StorageError>;

    /// Delete a service with its service bookings.
    async fn delete_service(&self, id: i64) -> Result<(), super::StorageError>;

    async fn create_service_booking(
        &self,
        booking: NewServiceBooking,
    ) -> Result<ServiceBooking, super::StorageError>;

    async fn get_service_booking(
        &self,
        id: i64,
    ) -> Result<Option<ServiceBooking>, super::StorageError>;

    async fn list_service_bookings(
        &self,
        scope: RecordScope,
    ) -> Result<Vec<ServiceBooking>, super::StorageError>;

    async fn update_service_booking_status(
        &self,
        id: i64,
        expected: ServiceBookingStatus,
        status: ServiceBookingStatus,
    ) -> Result<ServiceBooking, super::StorageError>;

    /// Cheap round trip used by health probes.
    async fn ping(&self) -> Result<(), super::StorageError> {
        Ok(())
    }
}

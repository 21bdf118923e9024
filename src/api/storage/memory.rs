//! In-memory storage backend.
//!
//! Used when no `DATABASE_URL` is configured and by the test suites. All
//! tables live behind one `RwLock`, so multi-row mutations are atomic.

use super::{StorageError, traits::*};
use crate::models::{
    ApprovalStatus, Booking, BookingStatus, Lease, LeaseStatus, NewBooking, NewLease, NewPayment,
    NewProperty, NewService, NewServiceBooking, NewUser, Payment, PaymentStatus, Property, Service,
    ServiceBooking, ServiceBookingStatus, User,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

struct Table<T> {
    last_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }

    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.last_id += 1;
        let row = build(self.last_id);
        self.rows.insert(self.last_id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }
}

struct Tables {
    users: Table<User>,
    properties: Table<Property>,
    bookings: Table<Booking>,
    payments: Table<Payment>,
    leases: Table<Lease>,
    services: Table<Service>,
    service_bookings: Table<ServiceBooking>,
}

impl Tables {
    fn owns(&self, landlord_id: i64, property_id: i64) -> bool {
        self.properties
            .rows
            .get(&property_id)
            .is_some_and(|p| p.landlord_id == landlord_id)
    }

    fn visible(&self, scope: RecordScope, tenant_id: i64, property_id: i64) -> bool {
        match scope {
            RecordScope::All => true,
            RecordScope::Tenant(id) => tenant_id == id,
            RecordScope::Landlord(id) => self.owns(id, property_id),
        }
    }
}

/// Storage backend holding every table in process memory.
pub struct MemoryStorageBackend {
    tables: RwLock<Tables>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                users: Table::new(),
                properties: Table::new(),
                bookings: Table::new(),
                payments: Table::new(),
                leases: Table::new(),
                services: Table::new(),
                service_bookings: Table::new(),
            }),
        }
    }
}

impl Default for MemoryStorageBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first<T>(rows: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, i64)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl StorageBackend for MemoryStorageBackend {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.username == user.username) {
            return Err(StorageError::conflict("username"));
        }
        if tables.users.rows.values().any(|u| u.email == user.email) {
            return Err(StorageError::conflict("email"));
        }
        Ok(tables.users.insert_with(|id| User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            approval_status: user.approval_status,
            created_at: Utc::now(),
        }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables.users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.rows.values().cloned().collect();
        newest_first(&mut users, |u| (u.created_at, u.id));
        Ok(users)
    }

    async fn set_approval_status(
        &self,
        id: i64,
        status: ApprovalStatus,
    ) -> Result<User, StorageError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .rows
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("User", id))?;
        user.approval_status = status;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<UserDeletion, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.rows.remove(&id).is_none() {
            return Err(StorageError::not_found("User", id));
        }

        let owned: HashSet<i64> = tables
            .properties
            .rows
            .values()
            .filter(|p| p.landlord_id == id)
            .map(|p| p.id)
            .collect();
        let touches = |tenant_id: i64, property_id: i64| {
            tenant_id == id || owned.contains(&property_id)
        };

        let bookings_before = tables.bookings.rows.len();
        tables
            .bookings
            .rows
            .retain(|_, b| !touches(b.tenant_id, b.property_id));
        let bookings_deleted = (bookings_before - tables.bookings.rows.len()) as u64;

        tables
            .payments
            .rows
            .retain(|_, p| !touches(p.tenant_id, p.property_id));
        tables
            .leases
            .rows
            .retain(|_, l| l.landlord_id != id && !touches(l.tenant_id, l.property_id));
        tables
            .service_bookings
            .rows
            .retain(|_, s| !touches(s.tenant_id, s.property_id));
        tables.properties.rows.retain(|pid, _| !owned.contains(pid));

        Ok(UserDeletion {
            properties_deleted: owned.len() as u64,
            bookings_deleted,
        })
    }

    async fn create_property(&self, property: NewProperty) -> Result<Property, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&property.landlord_id) {
            return Err(StorageError::not_found("User", property.landlord_id));
        }
        let now = Utc::now();
        Ok(tables.properties.insert_with(|id| Property {
            id,
            landlord_id: property.landlord_id,
            name: property.name,
            description: property.description,
            location: property.location,
            price: property.price,
            property_type: property.property_type,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            square_feet: property.square_feet,
            available: property.available,
            amenities: property.amenities,
            images: property.images,
            latitude: property.latitude,
            longitude: property.longitude,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_property(&self, id: i64) -> Result<Option<Property>, StorageError> {
        Ok(self.tables.read().await.properties.get(id))
    }

    async fn list_properties(&self, query: &PropertyQuery) -> Result<Vec<Property>, StorageError> {
        let tables = self.tables.read().await;
        let mut properties: Vec<Property> = tables
            .properties
            .rows
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        newest_first(&mut properties, |p| (p.created_at, p.id));
        Ok(properties)
    }

    async fn update_property(&self, property: Property) -> Result<Property, StorageError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .properties
            .rows
            .get_mut(&property.id)
            .ok_or_else(|| StorageError::not_found("Property", property.id))?;
        *slot = property.clone();
        Ok(property)
    }

    async fn delete_property(&self, id: i64) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        if tables.properties.rows.remove(&id).is_none() {
            return Err(StorageError::not_found("Property", id));
        }
        tables.bookings.rows.retain(|_, b| b.property_id != id);
        tables.service_bookings.rows.retain(|_, s| s.property_id != id);
        tables.payments.rows.retain(|_, p| p.property_id != id);
        tables.leases.rows.retain(|_, l| l.property_id != id);
        Ok(())
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.properties.rows.contains_key(&booking.property_id) {
            return Err(StorageError::not_found("Property", booking.property_id));
        }
        let now = Utc::now();
        Ok(tables.bookings.insert_with(|id| Booking {
            id,
            tenant_id: booking.tenant_id,
            property_id: booking.property_id,
            status: BookingStatus::Pending,
            message: booking.message,
            landlord_response: None,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_booking(&self, id: i64) -> Result<Option<Booking>, StorageError> {
        Ok(self.tables.read().await.bookings.get(id))
    }

    async fn list_bookings(&self, scope: RecordScope) -> Result<Vec<Booking>, StorageError> {
        let tables = self.tables.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .rows
            .values()
            .filter(|b| tables.visible(scope, b.tenant_id, b.property_id))
            .cloned()
            .collect();
        newest_first(&mut bookings, |b| (b.created_at, b.id));
        Ok(bookings)
    }

    async fn find_open_booking(
        &self,
        tenant_id: i64,
        property_id: i64,
    ) -> Result<Option<Booking>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .rows
            .values()
            .find(|b| {
                b.tenant_id == tenant_id && b.property_id == property_id && b.status.is_open()
            })
            .cloned())
    }

    async fn update_booking_status(
        &self,
        id: i64,
        expected: BookingStatus,
        status: BookingStatus,
        landlord_response: Option<String>,
        property_available: Option<bool>,
    ) -> Result<Booking, StorageError> {
        let mut tables = self.tables.write().await;
        let (property_id, current) = tables
            .bookings
            .rows
            .get(&id)
            .map(|b| (b.property_id, b.status))
            .ok_or_else(|| StorageError::not_found("Booking", id))?;
        if current != expected {
            return Err(StorageError::stale("Booking", id));
        }

        let still_booked = tables.bookings.rows.values().any(|b| {
            b.id != id && b.property_id == property_id && b.status == BookingStatus::Approved
        });
        let now = Utc::now();
        if let Some(available) = property_available {
            let property = tables
                .properties
                .rows
                .get_mut(&property_id)
                .ok_or_else(|| StorageError::not_found("Property", property_id))?;
            if !available && !property.available {
                return Err(StorageError::stale("Property", property_id));
            }
            if !(available && still_booked) {
                property.available = available;
                property.updated_at = now;
            }
        }

        let booking = tables
            .bookings
            .rows
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("Booking", id))?;
        booking.status = status;
        if landlord_response.is_some() {
            booking.landlord_response = landlord_response;
        }
        booking.updated_at = now;
        Ok(booking.clone())
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables.payments.insert_with(|id| Payment {
            id,
            tenant_id: payment.tenant_id,
            property_id: payment.property_id,
            lease_id: payment.lease_id,
            amount: payment.amount,
            method: payment.method,
            status: PaymentStatus::Pending,
            due_date: payment.due_date,
            paid_date: None,
            transaction_id: None,
            reference_number: None,
            notes: payment.notes,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn get_payment(&self, id: i64) -> Result<Option<Payment>, StorageError> {
        Ok(self.tables.read().await.payments.get(id))
    }

    async fn list_payments(
        &self,
        scope: RecordScope,
        limit: Option<usize>,
    ) -> Result<Vec<Payment>, StorageError> {
        let tables = self.tables.read().await;
        let mut payments: Vec<Payment> = tables
            .payments
            .rows
            .values()
            .filter(|p| tables.visible(scope, p.tenant_id, p.property_id))
            .cloned()
            .collect();
        newest_first(&mut payments, |p| (p.created_at, p.id));
        if let Some(limit) = limit {
            payments.truncate(limit);
        }
        Ok(payments)
    }

    async fn update_payment(
        &self,
        payment: Payment,
        expected: PaymentStatus,
    ) -> Result<Payment, StorageError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .payments
            .rows
            .get_mut(&payment.id)
            .ok_or_else(|| StorageError::not_found("Payment", payment.id))?;
        if slot.status != expected {
            return Err(StorageError::stale("Payment", payment.id));
        }
        *slot = payment.clone();
        Ok(payment)
    }

    async fn create_lease(&self, lease: NewLease) -> Result<Lease, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables.leases.insert_with(|id| Lease {
            id,
            property_id: lease.property_id,
            tenant_id: lease.tenant_id,
            landlord_id: lease.landlord_id,
            monthly_rent: lease.monthly_rent,
            security_deposit: lease.security_deposit,
            start_date: lease.start_date,
            end_date: lease.end_date,
            lease_duration_months: lease.lease_duration_months,
            status: LeaseStatus::Pending,
            pet_deposit: lease.pet_deposit,
            utilities_included: lease.utilities_included,
            parking_included: lease.parking_included,
            created_at: now,
            updated_at: now,
            signed_at: None,
        }))
    }

    async fn get_lease(&self, id: i64) -> Result<Option<Lease>, StorageError> {
        Ok(self.tables.read().await.leases.get(id))
    }

    async fn list_leases(&self, scope: RecordScope) -> Result<Vec<Lease>, StorageError> {
        let tables = self.tables.read().await;
        let mut leases: Vec<Lease> = tables
            .leases
            .rows
            .values()
            .filter(|l| match scope {
                RecordScope::Landlord(id) => l.landlord_id == id,
                other => tables.visible(other, l.tenant_id, l.property_id),
            })
            .cloned()
            .collect();
        newest_first(&mut leases, |l| (l.created_at, l.id));
        Ok(leases)
    }

    async fn update_lease(
        &self,
        lease: Lease,
        expected: LeaseStatus,
    ) -> Result<Lease, StorageError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .leases
            .rows
            .get_mut(&lease.id)
            .ok_or_else(|| StorageError::not_found("Lease", lease.id))?;
        if slot.status != expected {
            return Err(StorageError::stale("Lease", lease.id));
        }
        *slot = lease.clone();
        Ok(lease)
    }

    async fn create_service(&self, service: NewService) -> Result<Service, StorageError> {
        let mut tables = self.tables.write().await;
        Ok(tables.services.insert_with(|id| Service {
            id,
            name: service.name,
            description: service.description,
            rate: service.rate,
            is_active: service.is_active,
        }))
    }

    async fn get_service(&self, id: i64) -> Result<Option<Service>, StorageError> {
        Ok(self.tables.read().await.services.get(id))
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, StorageError> {
        let tables = self.tables.read().await;
        let mut services: Vec<Service> = tables
            .services
            .rows
            .values()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(services)
    }

    async fn update_service(&self, service: Service) -> Result<Service, StorageError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .services
            .rows
            .get_mut(&service.id)
            .ok_or_else(|| StorageError::not_found("Service", service.id))?;
        *slot = service.clone();
        Ok(service)
    }

    async fn delete_service(&self, id: i64) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        if tables.services.rows.remove(&id).is_none() {
            return Err(StorageError::not_found("Service", id));
        }
        tables.service_bookings.rows.retain(|_, s| s.service_id != id);
        Ok(())
    }

    async fn create_service_booking(
        &self,
        booking: NewServiceBooking,
    ) -> Result<ServiceBooking, StorageError> {
        let mut tables = self.tables.write().await;
        Ok(tables.service_bookings.insert_with(|id| ServiceBooking {
            id,
            tenant_id: booking.tenant_id,
            property_id: booking.property_id,
            service_id: booking.service_id,
            requested_date: booking.requested_date,
            status: ServiceBookingStatus::Pending,
            notes: booking.notes,
        }))
    }

    async fn get_service_booking(&self, id: i64) -> Result<Option<ServiceBooking>, StorageError> {
        Ok(self.tables.read().await.service_bookings.get(id))
    }

    async fn list_service_bookings(
        &self,
        scope: RecordScope,
    ) -> Result<Vec<ServiceBooking>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .service_bookings
            .rows
            .values()
            .rev()
            .filter(|s| tables.visible(scope, s.tenant_id, s.property_id))
            .cloned()
            .collect())
    }

    async fn update_service_booking_status(
        &self,
        id: i64,
        expected: ServiceBookingStatus,
        status: ServiceBookingStatus,
    ) -> Result<ServiceBooking, StorageError> {
        let mut tables = self.tables.write().await;
        let booking = tables
            .service_bookings
            .rows
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("ServiceBooking", id))?;
        if booking.status != expected {
            return Err(StorageError::stale("ServiceBooking", id));
        }
        booking.status = status;
        Ok(booking.clone())
    }
}

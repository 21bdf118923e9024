// Models module - users, listings, bookings, payments, leases and services

pub mod booking;
pub mod enums;
pub mod lease;
pub mod payment;
pub mod property;
pub mod service;
pub mod user;

pub use booking::{Booking, BookingRequest, BookingStatusUpdate, NewBooking};
pub use enums::{
    ApprovalStatus, BookingStatus, LeaseStatus, ParseEnumError, PaymentMethod, PaymentStatus,
    ServiceBookingStatus, UserRole,
};
pub use lease::{Lease, LeaseRequest, LeaseStatusUpdate, NewLease};
pub use payment::{NewPayment, Payment, PaymentCompletion, PaymentRequest};
pub use property::{NewProperty, Property, PropertyChanges, PropertyDraft};
pub use service::{
    NewService, NewServiceBooking, Service, ServiceBooking, ServiceBookingRequest,
    ServiceBookingStatusUpdate, ServiceChanges, ServiceDraft,
};
pub use user::{NewUser, User, UserResponse};

/// Serde helper for patch bodies: a present key (even `null`) becomes `Some(_)`,
/// a missing key stays `None` through `#[serde(default)]`.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

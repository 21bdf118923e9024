use super::enums::BookingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A tenant's request to rent a property.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: i64,
    pub tenant_id: i64,
    pub property_id: i64,
    pub status: BookingStatus,
    pub message: Option<String>,
    pub landlord_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookingRequest {
    pub property_id: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tenant_id: i64,
    pub property_id: i64,
    pub message: Option<String>,
}

/// Body of `PUT /api/bookings/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookingStatusUpdate {
    pub status: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

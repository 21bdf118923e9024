use super::enums::ServiceBookingStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An add-on service tenants can request for a property (cleaning, repairs).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub rate: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ServiceDraft {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub rate: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub rate: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ServiceChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::double_option::deserialize")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ServiceChanges {
    pub fn apply(self, service: &mut Service) {
        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(rate) = self.rate {
            service.rate = rate;
        }
        if let Some(is_active) = self.is_active {
            service.is_active = is_active;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceBooking {
    pub id: i64,
    pub tenant_id: i64,
    pub property_id: i64,
    pub service_id: i64,
    pub requested_date: NaiveDate,
    pub status: ServiceBookingStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ServiceBookingRequest {
    pub service_id: Option<i64>,
    pub property_id: Option<i64>,
    pub requested_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewServiceBooking {
    pub tenant_id: i64,
    pub property_id: i64,
    pub service_id: i64,
    pub requested_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ServiceBookingStatusUpdate {
    pub status: Option<String>,
}

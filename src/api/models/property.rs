use super::double_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Property {
    pub id: i64,
    pub landlord_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub price: f64,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: Option<f64>,
    pub available: bool,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Request body for creating a listing.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PropertyDraft {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub property_type: Option<String>,
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub square_feet: Option<f64>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Validated listing ready for insertion.
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub landlord_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub location: String,
    pub price: f64,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub square_feet: Option<f64>,
    pub available: bool,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partial update. Outer `None` leaves a field alone; for nullable columns an
/// explicit JSON `null` arrives as `Some(None)` and clears the value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PropertyChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub bathrooms: Option<i32>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<f64>)]
    pub square_feet: Option<Option<f64>>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<Vec<String>>)]
    pub amenities: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<Vec<String>>)]
    pub images: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<f64>)]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    #[schema(value_type = Option<f64>)]
    pub longitude: Option<Option<f64>>,
}

impl PropertyChanges {
    /// Write every present field onto `property` and bump `updated_at`.
    pub fn apply(self, property: &mut Property) {
        if let Some(name) = self.name {
            property.name = name;
        }
        if let Some(description) = self.description {
            property.description = description;
        }
        if let Some(location) = self.location {
            property.location = location;
        }
        if let Some(price) = self.price {
            property.price = price;
        }
        if let Some(property_type) = self.property_type {
            property.property_type = property_type;
        }
        if let Some(bedrooms) = self.bedrooms {
            property.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = self.bathrooms {
            property.bathrooms = bathrooms;
        }
        if let Some(square_feet) = self.square_feet {
            property.square_feet = square_feet;
        }
        if let Some(available) = self.available {
            property.available = available;
        }
        if let Some(amenities) = self.amenities {
            property.amenities = amenities.unwrap_or_default();
        }
        if let Some(images) = self.images {
            property.images = images.unwrap_or_default();
        }
        if let Some(latitude) = self.latitude {
            property.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            property.longitude = longitude;
        }
        property.updated_at = Utc::now();
    }
}

/// Encode a list column as JSON text; empty lists are stored as NULL.
pub fn encode_list(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        serde_json::to_string(items).ok()
    }
}

/// Decode a JSON text list column. NULL, empty or malformed text yields an empty list.
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(text) if !text.trim().is_empty() => serde_json::from_str(text).unwrap_or_default(),
        _ => Vec::new(),
    }
}

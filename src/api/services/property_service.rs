//! Property listings: public search and landlord CRUD.

use super::access::Actor;
use super::error::{ServiceError, ServiceResult};
use crate::models::{NewProperty, Property, PropertyChanges, PropertyDraft, User, UserRole};
use crate::storage::{PropertyQuery, StorageBackend, StorageError};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

/// Raw query string of `GET /api/properties`. Numbers arrive as text so a
/// malformed value can be reported instead of silently ignored.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingFilter {
    /// Exact property type
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Minimum number of bedrooms
    pub bedrooms: Option<String>,
    /// `true` for listings with coordinates, `false` for listings without
    pub has_gps: Option<String>,
}

fn parse_param<T: FromStr>(raw: Option<&str>, name: &str) -> ServiceResult<Option<T>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ServiceError::validation(format!("Invalid {} value: {}", name, value))),
    }
}

impl ListingFilter {
    /// Public listings only show available properties.
    pub fn into_query(self) -> ServiceResult<PropertyQuery> {
        let has_gps = match self.has_gps.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
            Some(v) => {
                return Err(ServiceError::validation(format!(
                    "Invalid has_gps value: {}",
                    v
                )));
            }
        };
        Ok(PropertyQuery {
            landlord_id: None,
            available_only: true,
            min_price: parse_param(self.min_price.as_deref(), "min_price")?,
            max_price: parse_param(self.max_price.as_deref(), "max_price")?,
            min_bedrooms: parse_param(self.bedrooms.as_deref(), "bedrooms")?,
            property_type: self.property_type.filter(|t| !t.trim().is_empty()),
            location: self.location.filter(|l| !l.trim().is_empty()),
            has_gps,
        })
    }
}

fn require_text(value: Option<String>, field: &str) -> ServiceResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::validation(format!("Missing required field: {}", field)))
}

/// A present text field of an update, trimmed; blank is refused.
fn non_empty_change(value: Option<String>, field: &str) -> ServiceResult<Option<String>> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(ServiceError::validation(format!(
            "{} cannot be empty",
            field
        ))),
        other => Ok(other),
    }
}

fn check_non_negative<T: PartialOrd + Default>(value: T, field: &str) -> ServiceResult<T> {
    if value < T::default() {
        Err(ServiceError::validation(format!(
            "{} must not be negative",
            field
        )))
    } else {
        Ok(value)
    }
}

#[derive(Clone)]
pub struct PropertyService {
    storage: Arc<dyn StorageBackend>,
}

impl PropertyService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn search(&self, filter: ListingFilter) -> ServiceResult<Vec<Property>> {
        let query = filter.into_query()?;
        Ok(self.storage.list_properties(&query).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Property> {
        self.storage
            .get_property(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Property not found"))
    }

    pub async fn create(&self, actor: Actor, draft: PropertyDraft) -> ServiceResult<Property> {
        actor.require_role(&[UserRole::Landlord, UserRole::Admin])?;

        let name = require_text(draft.name, "name")?;
        let location = require_text(draft.location, "location")?;
        let property_type = require_text(draft.property_type, "property_type")?;
        let price = draft
            .price
            .ok_or_else(|| ServiceError::validation("Missing required field: price"))?;
        let bedrooms = draft
            .bedrooms
            .ok_or_else(|| ServiceError::validation("Missing required field: bedrooms"))?;

        let property = NewProperty {
            landlord_id: actor.user_id,
            name,
            description: draft.description,
            location,
            price: check_non_negative(price, "price")?,
            property_type,
            bedrooms: check_non_negative(bedrooms, "bedrooms")?,
            bathrooms: check_non_negative(draft.bathrooms.unwrap_or(1), "bathrooms")?,
            square_feet: draft.square_feet,
            available: draft.available.unwrap_or(true),
            amenities: draft.amenities,
            images: draft.images,
            latitude: draft.latitude,
            longitude: draft.longitude,
        };

        let property = self.storage.create_property(property).await?;
        info!(
            "User {} listed property {} ({})",
            actor.user_id, property.id, property.name
        );
        Ok(property)
    }

    pub async fn update(
        &self,
        actor: Actor,
        id: i64,
        mut changes: PropertyChanges,
    ) -> ServiceResult<Property> {
        let mut property = self.get(id).await?;
        actor.require_owner_or_admin(
            property.landlord_id,
            "You can only update your own properties",
        )?;

        changes.name = non_empty_change(changes.name, "name")?;
        changes.location = non_empty_change(changes.location, "location")?;
        changes.property_type = non_empty_change(changes.property_type, "property_type")?;
        if let Some(price) = changes.price {
            check_non_negative(price, "price")?;
        }
        if let Some(bedrooms) = changes.bedrooms {
            check_non_negative(bedrooms, "bedrooms")?;
        }
        if let Some(bathrooms) = changes.bathrooms {
            check_non_negative(bathrooms, "bathrooms")?;
        }

        changes.apply(&mut property);
        Ok(self.storage.update_property(property).await?)
    }

    pub async fn delete(&self, actor: Actor, id: i64) -> ServiceResult<Property> {
        let property = self.get(id).await?;
        actor.require_owner_or_admin(
            property.landlord_id,
            "You can only delete your own properties",
        )?;
        self.storage.delete_property(id).await.map_err(|e| match e {
            StorageError::NotFound { .. } => ServiceError::not_found("Property not found"),
            other => other.into(),
        })?;
        info!("User {} deleted property {}", actor.user_id, id);
        Ok(property)
    }

    pub async fn landlord_of(&self, id: i64) -> ServiceResult<User> {
        let property = self.get(id).await?;
        self.storage
            .get_user(property.landlord_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Landlord not found"))
    }

    pub async fn owned_by(&self, actor: Actor) -> ServiceResult<Vec<Property>> {
        actor.require_role(&[UserRole::Landlord, UserRole::Admin])?;
        let query = PropertyQuery {
            landlord_id: Some(actor.user_id),
            ..PropertyQuery::default()
        };
        Ok(self.storage.list_properties(&query).await?)
    }
}

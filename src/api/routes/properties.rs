//! Property listing routes.
//!
//! Searching and reading listings is public; creating and editing them
//! requires a landlord (or admin) token.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde_json::{Value, json};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::models::{Property, PropertyChanges, PropertyDraft};
use crate::services::ListingFilter;

/// Create the property router (mounted under /api)
pub fn properties_router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list_properties).post(create_property))
        .route(
            "/properties/{id}",
            get(get_property).put(update_property).delete(delete_property),
        )
        .route("/properties/{id}/landlord", get(get_property_landlord))
        .route("/landlord/properties", get(list_landlord_properties))
}

fn listing_body(message: &str, properties: Vec<Property>) -> Json<Value> {
    Json(json!({
        "message": message,
        "total": properties.len(),
        "properties": properties,
    }))
}

/// GET /api/properties - Search available listings
#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(ListingFilter),
    responses(
        (status = 200, description = "Available properties, newest first", body = Object),
        (status = 400, description = "Unparseable filter value")
    )
)]
pub async fn list_properties(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListingFilter>,
) -> ApiResult<Json<Value>> {
    let properties = state.property_service().search(filter).await?;
    Ok(listing_body("Properties retrieved successfully", properties))
}

/// POST /api/properties - List a new property
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    request_body = PropertyDraft,
    responses(
        (status = 201, description = "Property created", body = Object),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Caller is not a landlord or admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_property(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(draft): ApiJson<PropertyDraft>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let property = state
        .property_service()
        .create(auth.actor(), draft)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Property created successfully",
            "property": property,
        })),
    ))
}

/// GET /api/properties/{id} - One listing
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property", body = Property),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Property>> {
    Ok(Json(state.property_service().get(id).await?))
}

/// PUT /api/properties/{id} - Partial update; a `null` clears an optional field
#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property id")),
    request_body = PropertyChanges,
    responses(
        (status = 200, description = "Property updated", body = Object),
        (status = 400, description = "Invalid field value"),
        (status = 403, description = "Caller does not own the property"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_property(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<PropertyChanges>,
) -> ApiResult<Json<Value>> {
    let property = state
        .property_service()
        .update(auth.actor(), id, changes)
        .await?;
    Ok(Json(json!({
        "message": "Property updated successfully",
        "property": property,
    })))
}

/// DELETE /api/properties/{id} - Remove a listing and its bookings
#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property id")),
    responses(
        (status = 200, description = "Property deleted", body = Object),
        (status = 403, description = "Caller does not own the property"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_property(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let property = state.property_service().delete(auth.actor(), id).await?;
    Ok(Json(json!({
        "message": format!("Property {} deleted successfully", property.name),
    })))
}

/// GET /api/properties/{id}/landlord - Contact details of the listing's landlord
#[utoipa::path(
    get,
    path = "/api/properties/{id}/landlord",
    tag = "Properties",
    params(("id" = i64, Path, description = "Property id")),
    responses(
        (status = 200, description = "Landlord contact", body = Object),
        (status = 401, description = "Missing, invalid or revoked token"),
        (status = 404, description = "Property or landlord not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_property_landlord(
    State(state): State<AppState>,
    _auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let service = state.property_service();
    let property = service.get(id).await?;
    let landlord = service.landlord_of(id).await?;
    Ok(Json(json!({
        "landlord": {
            "id": landlord.id,
            "username": landlord.username,
            "email": landlord.email,
            "property_name": property.name,
            "property_location": property.location,
        }
    })))
}

/// GET /api/landlord/properties - The caller's own listings, available or not
#[utoipa::path(
    get,
    path = "/api/landlord/properties",
    tag = "Properties",
    responses(
        (status = 200, description = "Caller's properties, newest first", body = Object),
        (status = 403, description = "Caller is not a landlord or admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_landlord_properties(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let properties = state.property_service().owned_by(auth.actor()).await?;
    Ok(listing_body("Landlord properties retrieved successfully", properties))
}

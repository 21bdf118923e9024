//! Add-on service catalog and tenants' service requests.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use serde_json::{Value, json};

use super::app_state::AppState;
use super::auth_context::{AuthContext, MaybeAuth};
use super::error::{ApiJson, ApiPath, ApiResult};
use crate::models::{
    ServiceBookingRequest, ServiceBookingStatusUpdate, ServiceChanges, ServiceDraft,
};

/// Create the services router (mounted under /api)
pub fn service_catalog_router() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            put(update_service).delete(delete_service),
        )
        .route(
            "/service-bookings",
            get(list_service_bookings).post(request_service),
        )
        .route("/service-bookings/{id}", put(update_service_booking))
}

/// GET /api/services - Offered services; admins also see inactive ones
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    responses(
        (status = 200, description = "Services ordered by name", body = Object)
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    MaybeAuth(auth): MaybeAuth,
) -> ApiResult<Json<Value>> {
    let services = state
        .catalog_service()
        .list(auth.map(|a| a.actor()))
        .await?;
    Ok(Json(json!({
        "total": services.len(),
        "services": services,
    })))
}

/// POST /api/services - Add a service to the catalog
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    request_body = ServiceDraft,
    responses(
        (status = 201, description = "Service created", body = Object),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_service(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(draft): ApiJson<ServiceDraft>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let service = state.catalog_service().create(auth.actor(), draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Service created successfully",
            "service": service,
        })),
    ))
}

/// PUT /api/services/{id} - Edit a catalog entry
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = i64, Path, description = "Service id")),
    request_body = ServiceChanges,
    responses(
        (status = 200, description = "Service updated", body = Object),
        (status = 400, description = "Invalid field value"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_service(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(changes): ApiJson<ServiceChanges>,
) -> ApiResult<Json<Value>> {
    let service = state
        .catalog_service()
        .update(auth.actor(), id, changes)
        .await?;
    Ok(Json(json!({
        "message": "Service updated successfully",
        "service": service,
    })))
}

/// DELETE /api/services/{id} - Remove a catalog entry and its requests
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = i64, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service deleted", body = Object),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Service not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_service(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    state.catalog_service().delete(auth.actor(), id).await?;
    Ok(Json(json!({ "message": "Service deleted successfully" })))
}

/// POST /api/service-bookings - Request a service for a property
#[utoipa::path(
    post,
    path = "/api/service-bookings",
    tag = "Services",
    request_body = ServiceBookingRequest,
    responses(
        (status = 201, description = "Service requested", body = Object),
        (status = 400, description = "Missing field or service not offered"),
        (status = 403, description = "Caller is not a tenant"),
        (status = 404, description = "Service or property not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn request_service(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(request): ApiJson<ServiceBookingRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let booking = state
        .catalog_service()
        .request(auth.actor(), request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Service request submitted successfully",
            "service_booking": booking,
        })),
    ))
}

/// GET /api/service-bookings - Service requests visible to the caller
#[utoipa::path(
    get,
    path = "/api/service-bookings",
    tag = "Services",
    responses(
        (status = 200, description = "Service requests, newest first", body = Object)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_service_bookings(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let bookings = state.catalog_service().list_requests(auth.actor()).await?;
    Ok(Json(json!({
        "total": bookings.len(),
        "service_bookings": bookings,
    })))
}

/// PUT /api/service-bookings/{id} - Approve, reject or complete a request
#[utoipa::path(
    put,
    path = "/api/service-bookings/{id}",
    tag = "Services",
    params(("id" = i64, Path, description = "Service booking id")),
    request_body = ServiceBookingStatusUpdate,
    responses(
        (status = 200, description = "Service request updated", body = Object),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller is not the property's landlord or an admin"),
        (status = 404, description = "Service booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_service_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ServiceBookingStatusUpdate>,
) -> ApiResult<Json<Value>> {
    let booking = state
        .catalog_service()
        .update_request(auth.actor(), id, update)
        .await?;
    Ok(Json(json!({
        "message": format!("Service request {}", booking.status),
        "service_booking": booking,
    })))
}

//! Booking routes: tenants request, landlords decide.

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
use super::error::{ApiJson, ApiPath, ApiResult};
use crate::models::{Booking, BookingRequest, BookingStatusUpdate};

/// Create the booking router (mounted under /api)
pub fn bookings_router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", get(get_booking).put(update_booking))
}

/// POST /api/bookings - Request to rent a property
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking requested", body = Object),
        (status = 400, description = "Missing field or property unavailable"),
        (status = 403, description = "Caller is not a tenant"),
        (status = 404, description = "Property not found"),
        (status = 409, description = "An open booking already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(request): ApiJson<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let booking = state
        .booking_service()
        .request(auth.actor(), request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking request submitted successfully",
            "booking": booking,
        })),
    ))
}

/// GET /api/bookings - Bookings visible to the caller
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    responses(
        (status = 200, description = "Bookings, newest first", body = Object),
        (status = 401, description = "Missing, invalid or revoked token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let bookings = state.booking_service().list(auth.actor()).await?;
    Ok(Json(json!({
        "total": bookings.len(),
        "bookings": bookings,
    })))
}

/// GET /api/bookings/{id} - One booking, for its tenant, the landlord or an admin
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Caller is not a party to the booking"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Booking>> {
    Ok(Json(state.booking_service().get(auth.actor(), id).await?))
}

/// PUT /api/bookings/{id} - Approve, reject or cancel
#[utoipa::path(
    put,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = i64, Path, description = "Booking id")),
    request_body = BookingStatusUpdate,
    responses(
        (status = 200, description = "Booking updated", body = Object),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller is not a party to the booking"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_booking(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<BookingStatusUpdate>,
) -> ApiResult<Json<Value>> {
    let booking = state
        .booking_service()
        .update_status(auth.actor(), id, update)
        .await?;
    Ok(Json(json!({
        "message": format!("Booking {} successfully", booking.status),
        "booking": booking,
    })))
}

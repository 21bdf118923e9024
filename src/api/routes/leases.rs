//! Lease routes.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use serde_json::{Value, json};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiJson, ApiPath, ApiResult};
use crate::models::{Lease, LeaseRequest, LeaseStatusUpdate};

/// Create the lease router (mounted under /api)
pub fn leases_router() -> Router<AppState> {
    Router::new()
        .route("/leases", get(list_leases).post(create_lease))
        .route("/leases/{id}", get(get_lease))
        .route("/leases/{id}/status", put(update_lease_status))
}

/// POST /api/leases - Draft a lease for one of the caller's properties
#[utoipa::path(
    post,
    path = "/api/leases",
    tag = "Leases",
    request_body = LeaseRequest,
    responses(
        (status = 201, description = "Lease created as pending", body = Object),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Caller does not own the property"),
        (status = 404, description = "Property or tenant not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_lease(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(request): ApiJson<LeaseRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let lease = state.lease_service().create(auth.actor(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lease created successfully",
            "lease": lease,
        })),
    ))
}

/// GET /api/leases - Leases visible to the caller
#[utoipa::path(
    get,
    path = "/api/leases",
    tag = "Leases",
    responses(
        (status = 200, description = "Leases, newest first", body = Object)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_leases(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let leases = state.lease_service().list(auth.actor()).await?;
    Ok(Json(json!({
        "total": leases.len(),
        "leases": leases,
    })))
}

/// GET /api/leases/{id} - One lease, for its parties or an admin
#[utoipa::path(
    get,
    path = "/api/leases/{id}",
    tag = "Leases",
    params(("id" = i64, Path, description = "Lease id")),
    responses(
        (status = 200, description = "Lease", body = Lease),
        (status = 403, description = "Caller is not a party to the lease"),
        (status = 404, description = "Lease not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_lease(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Lease>> {
    Ok(Json(state.lease_service().get(auth.actor(), id).await?))
}

/// PUT /api/leases/{id}/status - Activate, expire or terminate a lease
#[utoipa::path(
    put,
    path = "/api/leases/{id}/status",
    tag = "Leases",
    params(("id" = i64, Path, description = "Lease id")),
    request_body = LeaseStatusUpdate,
    responses(
        (status = 200, description = "Lease updated", body = Object),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Caller is not the lease's landlord or an admin"),
        (status = 404, description = "Lease not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_lease_status(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<LeaseStatusUpdate>,
) -> ApiResult<Json<Value>> {
    let lease = state
        .lease_service()
        .update_status(auth.actor(), id, update)
        .await?;
    Ok(Json(json!({
        "message": format!("Lease is now {}", lease.status),
        "lease": lease,
    })))
}

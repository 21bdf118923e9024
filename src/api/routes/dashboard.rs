//! Role dashboards and the caller's profile.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::get,
};
use serde_json::{Value, json};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiResult;
use crate::services::dashboard_service::{AdminDashboard, LandlordDashboard, TenantDashboard};

/// Create the dashboard router
pub fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/tenant", get(tenant_dashboard))
        .route("/landlord", get(landlord_dashboard))
        .route("/admin", get(admin_dashboard))
        .route("/profile", get(profile))
        .route("/health", get(authenticated_health))
}

/// GET /dashboard/tenant
#[utoipa::path(
    get,
    path = "/dashboard/tenant",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Tenant dashboard", body = TenantDashboard),
        (status = 403, description = "Caller is not a tenant")
    ),
    security(("bearer_auth" = []))
)]
pub async fn tenant_dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<TenantDashboard>> {
    Ok(Json(state.dashboard_service().tenant(auth.actor()).await?))
}

/// GET /dashboard/landlord
#[utoipa::path(
    get,
    path = "/dashboard/landlord",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Landlord dashboard", body = LandlordDashboard),
        (status = 403, description = "Caller is not a landlord")
    ),
    security(("bearer_auth" = []))
)]
pub async fn landlord_dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<LandlordDashboard>> {
    Ok(Json(state.dashboard_service().landlord(auth.actor()).await?))
}

/// GET /dashboard/admin
#[utoipa::path(
    get,
    path = "/dashboard/admin",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Admin dashboard", body = AdminDashboard),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<AdminDashboard>> {
    Ok(Json(state.dashboard_service().admin(auth.actor()).await?))
}

/// GET /dashboard/profile - Token identity and what the role may do
#[utoipa::path(
    get,
    path = "/dashboard/profile",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Profile", body = Object),
        (status = 401, description = "Missing, invalid or revoked token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn profile(auth: AuthContext) -> Json<Value> {
    Json(json!({
        "user": {
            "user_id": auth.user_id,
            "username": auth.username,
            "role": auth.role,
        },
        "permissions": auth.role.permissions(),
    }))
}

/// GET /dashboard/health - Health probe that also checks the token and store
#[utoipa::path(
    get,
    path = "/dashboard/health",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Healthy", body = Object),
        (status = 401, description = "Missing, invalid or revoked token"),
        (status = 500, description = "Storage unreachable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn authenticated_health(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    state.storage.ping().await?;
    Ok(Json(json!({
        "status": "healthy",
        "user": auth.username,
        "role": auth.role,
    })))
}

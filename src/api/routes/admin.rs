//! Admin routes: account approval queue and platform analytics.

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, ApiPath, ApiQuery, ApiResult};
use crate::models::{ApprovalStatus, UserResponse, UserRole};
use crate::services::dashboard_service::Analytics;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    /// tenant, landlord or admin
    pub role: Option<String>,
    /// pending, approved or rejected
    pub status: Option<String>,
}

/// Create the admin router
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/pending", get(list_pending_users))
        .route("/users/{id}/approve", put(approve_user))
        .route("/users/{id}/reject", put(reject_user))
        .route("/analytics", get(analytics))
}

fn users_body(users: Vec<crate::models::User>) -> Json<Value> {
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Json(json!({ "total": users.len(), "users": users }))
}

/// GET /admin/users - All accounts, optionally filtered by role and status
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    params(UserListQuery),
    responses(
        (status = 200, description = "Accounts, newest first", body = Object),
        (status = 400, description = "Unknown role or status filter"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> ApiResult<Json<Value>> {
    auth.actor().require_role(&[UserRole::Admin])?;
    let role: Option<UserRole> = query
        .role
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| ApiError::bad_request(format!("Invalid filter: {}", e)))?;
    let status: Option<ApprovalStatus> = query
        .status
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| ApiError::bad_request(format!("Invalid filter: {}", e)))?;

    let users = state.user_service().list_users(role, status).await?;
    Ok(users_body(users))
}

/// GET /admin/users/pending - Accounts awaiting a decision
#[utoipa::path(
    get,
    path = "/admin/users/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Pending accounts", body = Object),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_pending_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    auth.actor().require_role(&[UserRole::Admin])?;
    let users = state.user_service().pending_users().await?;
    Ok(users_body(users))
}

/// PUT /admin/users/{id}/approve - Approve a pending or rejected account
#[utoipa::path(
    put,
    path = "/admin/users/{id}/approve",
    tag = "Admin",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account approved", body = Object),
        (status = 400, description = "Account already approved"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.actor().require_role(&[UserRole::Admin])?;
    let user = state.user_service().approve(id).await?;
    Ok(Json(json!({
        "message": format!("User {} has been approved", user.username),
        "user": UserResponse::from(user),
    })))
}

/// PUT /admin/users/{id}/reject - Reject an account that is not yet approved
#[utoipa::path(
    put,
    path = "/admin/users/{id}/reject",
    tag = "Admin",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account rejected", body = Object),
        (status = 400, description = "Account already approved"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    auth.actor().require_role(&[UserRole::Admin])?;
    let user = state.user_service().reject(id).await?;
    Ok(Json(json!({
        "message": format!("User {} has been rejected", user.username),
        "user": UserResponse::from(user),
    })))
}

/// GET /admin/analytics - Platform-wide counts
#[utoipa::path(
    get,
    path = "/admin/analytics",
    tag = "Admin",
    responses(
        (status = 200, description = "Analytics", body = Analytics),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn analytics(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Analytics>> {
    let analytics = state.dashboard_service().analytics(auth.actor()).await?;
    Ok(Json(analytics))
}

//! Authentication routes: email/password accounts with JWT tokens.
//!
//! - Registration creates a pending account; an admin must approve it
//! - Login issues an access token (1 hour) and a refresh token (30 days)
//! - Logout revokes the login session: its access and refresh tokens alike

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiError, ApiJson, ApiResult, json_or_default};
use crate::models::{UserResponse, UserRole};
use crate::services::{JwtService, LoginRequest, RegisterRequest, TokenPair};

/// Body of register and login responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
    /// Absent while the account awaits approval
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenPair>,
    /// `pending_approval` when no tokens were issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshTokenResponse {
    pub message: String,
    pub access_token: String,
    pub access_token_expires_at: i64,
    pub token_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenIdentity {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    pub user: TokenIdentity,
    pub expires_at: i64,
}

/// Create the auth router
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/refresh", post(refresh_token))
        .route("/validate", post(validate_token))
        .route("/delete-account", delete(delete_account))
}

/// POST /auth/register - Create a tenant or landlord account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, pending approval", body = AuthResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Role not open to public registration"),
        (status = 409, description = "Username or email already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let registration = state.auth_service().register(request).await?;
    let pending = registration.tokens.is_none();

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: if pending {
                "Registration successful. Your account is pending admin approval".to_string()
            } else {
                "User registered successfully".to_string()
            },
            user: UserResponse::from(registration.user),
            tokens: registration.tokens,
            status: pending.then(|| "pending_approval".to_string()),
        }),
    ))
}

/// POST /auth/login - Exchange email and password for tokens
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing or malformed credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account pending approval or rejected")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (user, tokens) = state.auth_service().login(request).await?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserResponse::from(user),
        tokens: Some(tokens),
        status: None,
    }))
}

/// POST /auth/logout - Revoke the session of the presented access token
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Logged out", body = Object),
        (status = 401, description = "Missing, invalid or revoked token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> Json<Value> {
    state.auth_service().logout(auth.session).await;
    info!("User {} logged out, revoked session {}", auth.username, auth.session);
    Json(json!({
        "message": format!("User {} logged out successfully", auth.username)
    }))
}

/// GET /auth/me - Current user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = Object),
        (status = 401, description = "Missing, invalid or revoked token"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Value>> {
    let user = state.auth_service().current_user(auth.user_id).await?;
    Ok(Json(json!({ "user": UserResponse::from(user) })))
}

/// POST /auth/refresh - Issue a new access token from a refresh token
///
/// The refresh token may be sent as `Authorization: Bearer` or in the body.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "Authentication",
    request_body(content = RefreshTokenRequest, description = "Optional when the refresh token is sent as Bearer"),
    responses(
        (status = 200, description = "New access token", body = RefreshTokenResponse),
        (status = 401, description = "Invalid or revoked refresh token, or account no longer active")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<RefreshTokenResponse>> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_bearer_token)
        .map(str::to_string);

    let token = match from_header {
        Some(token) => token,
        None => {
            let request: RefreshTokenRequest = json_or_default(&body)?;
            request
                .refresh_token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ApiError::unauthorized("Refresh token is required"))?
        }
    };

    let (access_token, expires_at) = state.auth_service().refresh(&token).await?;

    Ok(Json(RefreshTokenResponse {
        message: "Token refreshed successfully".to_string(),
        access_token,
        access_token_expires_at: expires_at,
        token_type: "Bearer".to_string(),
    }))
}

/// POST /auth/validate - Check the presented access token
#[utoipa::path(
    post,
    path = "/auth/validate",
    tag = "Authentication",
    responses(
        (status = 200, description = "Token is valid", body = ValidateResponse),
        (status = 401, description = "Missing, invalid or revoked token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn validate_token(auth: AuthContext) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: true,
        user: TokenIdentity {
            user_id: auth.user_id,
            username: auth.username,
            role: auth.role,
        },
        expires_at: auth.expires_at,
    })
}

/// DELETE /auth/delete-account - Delete the caller and everything they own
#[utoipa::path(
    delete,
    path = "/auth/delete-account",
    tag = "Authentication",
    responses(
        (status = 200, description = "Account deleted", body = Object),
        (status = 401, description = "Missing, invalid or revoked token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let deletion = state
        .auth_service()
        .delete_account(auth.user_id, auth.session)
        .await?;

    Ok(Json(json!({
        "message": format!("Account for {} has been deleted successfully", auth.username),
        "properties_deleted": deletion.properties_deleted,
        "bookings_deleted": deletion.bookings_deleted,
    })))
}

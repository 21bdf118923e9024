//! Authentication context utilities.
//!
//! Provides the extractor that turns a Bearer access token into the caller's
//! identity.

use super::app_state::AppState;
use super::error::ApiError;
use crate::models::UserRole;
use crate::services::{Actor, JwtService};
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use uuid::Uuid;

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    pub jti: Uuid,
    /// Login session of the token, revoked on logout
    pub session: Uuid,
    /// Expiry of the presented access token (Unix timestamp)
    pub expires_at: i64,
}

impl AuthContext {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

/// Pull the raw token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(JwtService::extract_bearer_token)
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            tracing::debug!("No authorization token provided");
            ApiError::unauthorized("Authorization token is required")
        })?;

        let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            ApiError::unauthorized(e)
        })?;

        if state.revoked_tokens.is_revoked(&claims.sid).await {
            tracing::warn!(
                "Token {} from revoked session {} presented by user {}",
                claims.jti,
                claims.sid,
                claims.user_id
            );
            return Err(ApiError::unauthorized("Token has been revoked"));
        }

        Ok(AuthContext {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
            jti: claims.jti,
            session: claims.sid,
            expires_at: claims.exp,
        })
    }
}

/// Optional variant for public routes whose output depends on the caller.
/// A missing or invalid token yields `None` instead of a rejection.
#[derive(Clone, Debug)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl FromRequestParts<AppState> for MaybeAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(
            AuthContext::from_request_parts(parts, state).await.ok(),
        ))
    }
}

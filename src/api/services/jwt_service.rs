//! JWT Service for token generation and validation.
//!
//! Provides time-scoped JWT tokens for API authentication.
//! - Access tokens: short-lived (1 hour by default) for API requests
//! - Refresh tokens: longer-lived (30 days by default) for obtaining new access tokens

use crate::config::AppConfig;
use crate::models::{User, UserRole};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id as a string)
    pub sub: String,
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token type: "access" or "refresh"
    pub token_type: TokenType,
    /// Token id
    pub jti: Uuid,
    /// Login session shared by a token pair and every access token refreshed
    /// from it. Logout revokes the whole session.
    pub sid: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Token pair returned after authentication
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: i64,
    pub refresh_token_expires_at: i64,
    pub token_type: String,
}

/// JWT Service configuration
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl JwtService {
    /// Create a new JWT service with the given secret and default lifetimes.
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(1), Duration::days(30))
    }

    pub fn with_ttl(secret: &str, access: Duration, refresh: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_duration: access,
            refresh_token_duration: refresh,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_ttl(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        )
    }

    fn issue(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
        token_type: TokenType,
        sid: Uuid,
    ) -> Result<(String, i64), String> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_token_duration,
            TokenType::Refresh => self.refresh_token_duration,
        };
        let exp = (now + lifetime).timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            username: username.to_string(),
            role,
            exp,
            iat: now.timestamp(),
            token_type,
            jti: Uuid::new_v4(),
            sid,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| format!("Failed to encode {:?} token: {}", token_type, e))?;
        Ok((token, exp))
    }

    /// Generate a token pair (access + refresh) for a user
    pub fn generate_token_pair(&self, user: &User) -> Result<TokenPair, String> {
        let sid = Uuid::new_v4();
        let (access_token, access_exp) =
            self.issue(user.id, &user.username, user.role, TokenType::Access, sid)?;
        let (refresh_token, refresh_exp) =
            self.issue(user.id, &user.username, user.role, TokenType::Refresh, sid)?;

        debug!(
            "Generated token pair for user {} (id {}), access expires: {}, refresh expires: {}",
            user.username, user.id, access_exp, refresh_exp
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
            token_type: "Bearer".to_string(),
        })
    }

    /// Validate an access token and return the claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, String> {
        let token_data = self.decode_token(token)?;

        if token_data.claims.token_type != TokenType::Access {
            return Err("Invalid token type: expected access token".to_string());
        }

        Ok(token_data.claims)
    }

    /// Validate a refresh token and return the claims
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, String> {
        let token_data = self.decode_token(token)?;

        if token_data.claims.token_type != TokenType::Refresh {
            return Err("Invalid token type: expected refresh token".to_string());
        }

        Ok(token_data.claims)
    }

    /// Decode and validate a token (checks signature and expiration)
    fn decode_token(&self, token: &str) -> Result<TokenData<Claims>, String> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidToken => "Invalid token format".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                "Invalid token signature".to_string()
            }
            _ => format!("Token validation failed: {}", e),
        })
    }

    /// Issue an access token for `user` inside an existing session.
    pub fn issue_access_token(&self, user: &User, sid: Uuid) -> Result<(String, i64), String> {
        self.issue(user.id, &user.username, user.role, TokenType::Access, sid)
    }

    /// Unix time after which no token of a session issued up to now can
    /// still be valid.
    pub fn session_horizon(&self) -> i64 {
        (Utc::now() + self.refresh_token_duration + self.access_token_duration).timestamp()
    }

    /// Extract bearer token from Authorization header
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Shared JWT service for use across the application
pub type SharedJwtService = Arc<JwtService>;

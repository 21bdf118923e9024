//! Registration, login and account lifecycle.

use super::error::{ServiceError, ServiceResult};
use super::jwt_service::{SharedJwtService, TokenPair};
use super::password_service::PasswordService;
use super::revocation::RevokedTokens;
use crate::config::AdminBootstrap;
use crate::models::{ApprovalStatus, NewUser, User, UserResponse, UserRole};
use crate::storage::{StorageBackend, StorageError, UserDeletion};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `tenant` (default) or `landlord`
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Registration {
    pub user: User,
    /// Only issued when the account is usable straight away.
    pub tokens: Option<TokenPair>,
}

fn looks_like_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

fn required(value: Option<String>, field: &str) -> ServiceResult<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServiceError::validation(format!("Missing required field: {}", field)))
}

#[derive(Clone)]
pub struct AuthService {
    storage: Arc<dyn StorageBackend>,
    passwords: PasswordService,
    jwt: SharedJwtService,
    revoked: RevokedTokens,
}

impl AuthService {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        passwords: PasswordService,
        jwt: SharedJwtService,
        revoked: RevokedTokens,
    ) -> Self {
        Self {
            storage,
            passwords,
            jwt,
            revoked,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<Registration> {
        let username = required(request.username, "username")?.trim().to_string();
        let email = required(request.email, "email")?.trim().to_lowercase();
        let password = required(request.password, "password")?;
        let role_name = request.role.unwrap_or_else(|| "tenant".to_string());

        if username.chars().count() < 3 {
            return Err(ServiceError::validation(
                "Username must be at least 3 characters long",
            ));
        }
        if !looks_like_email(&email) {
            return Err(ServiceError::validation("Invalid email format"));
        }
        if password.chars().count() < 6 {
            return Err(ServiceError::validation(
                "Password must be at least 6 characters long",
            ));
        }

        let role: UserRole = role_name.parse().map_err(|_| {
            ServiceError::validation("Invalid role. Must be one of: tenant, landlord")
        })?;
        if !role.is_public() {
            return Err(ServiceError::forbidden("Invalid role for public registration"));
        }

        if self.storage.get_user_by_username(&username).await?.is_some() {
            return Err(ServiceError::Conflict("Username already exists".to_string()));
        }
        if self.storage.get_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.passwords.hash(&password).await?;
        let user = self
            .storage
            .create_user(NewUser::new(username, email, password_hash, role))
            .await
            .map_err(conflict_message)?;

        info!("Registered {} account {} (id {})", user.role, user.username, user.id);

        let tokens = if user.is_approved() {
            Some(self.issue_tokens(&user)?)
        } else {
            None
        };
        Ok(Registration { user, tokens })
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<(User, TokenPair)> {
        let email = request
            .email
            .map(|e| e.trim().to_lowercase())
            .unwrap_or_default();
        let password = request.password.unwrap_or_default();

        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::validation("Email and password are required"));
        }
        if !looks_like_email(&email) {
            return Err(ServiceError::validation("Invalid email format"));
        }

        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());
        let user = self
            .storage
            .get_user_by_email(&email)
            .await?
            .ok_or_else(invalid)?;
        if !self.passwords.verify(&password, &user.password_hash).await {
            return Err(invalid());
        }

        match user.approval_status {
            ApprovalStatus::Pending => {
                return Err(ServiceError::PendingApproval {
                    user: Box::new(UserResponse::from(&user)),
                });
            }
            ApprovalStatus::Rejected => return Err(ServiceError::AccountRejected),
            ApprovalStatus::Approved => {}
        }

        let tokens = self.issue_tokens(&user)?;
        info!("User {} logged in", user.username);
        Ok((user, tokens))
    }

    pub async fn current_user(&self, user_id: i64) -> ServiceResult<User> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))
    }

    /// Exchange a refresh token for a new access token in the same session.
    /// The account must still exist and be approved; the new token carries
    /// the stored role.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<(String, i64)> {
        let claims = self.jwt.validate_refresh_token(refresh_token).map_err(|e| {
            warn!("Token refresh failed: {}", e);
            ServiceError::Unauthorized(e)
        })?;
        if self.revoked.is_revoked(&claims.sid).await {
            warn!(
                "Refresh from revoked session {} by user {}",
                claims.sid, claims.user_id
            );
            return Err(ServiceError::Unauthorized("Token has been revoked".to_string()));
        }

        let user = self
            .storage
            .get_user(claims.user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("User no longer exists".to_string()))?;
        if !user.is_approved() {
            return Err(ServiceError::Unauthorized("Account is not approved".to_string()));
        }

        self.jwt
            .issue_access_token(&user, claims.sid)
            .map_err(ServiceError::Internal)
    }

    /// Revoke every token of a login session.
    pub async fn logout(&self, sid: Uuid) {
        self.revoked.revoke(sid, self.jwt.session_horizon()).await;
    }

    pub async fn delete_account(&self, user_id: i64, sid: Uuid) -> ServiceResult<UserDeletion> {
        let deletion = self.storage.delete_user(user_id).await.map_err(|e| match e {
            StorageError::NotFound { .. } => ServiceError::not_found("User not found"),
            other => other.into(),
        })?;
        self.logout(sid).await;
        info!(
            "Deleted account {} with {} properties",
            user_id, deletion.properties_deleted
        );
        Ok(deletion)
    }

    /// Create the configured admin unless an account with that email exists.
    /// Returns whether an account was created.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> ServiceResult<bool> {
        if self.storage.get_user_by_email(&admin.email).await?.is_some() {
            return Ok(false);
        }
        let password_hash = self.passwords.hash(&admin.password).await?;
        let user = self
            .storage
            .create_user(NewUser::new(
                admin.username.clone(),
                admin.email.clone(),
                password_hash,
                UserRole::Admin,
            ))
            .await
            .map_err(conflict_message)?;
        info!("Created admin account {} (id {})", user.email, user.id);
        Ok(true)
    }

    fn issue_tokens(&self, user: &User) -> ServiceResult<TokenPair> {
        self.jwt
            .generate_token_pair(user)
            .map_err(ServiceError::Internal)
    }
}

/// A unique violation that slipped past the pre-checks (concurrent signup).
fn conflict_message(err: StorageError) -> ServiceError {
    match err {
        StorageError::Conflict { field } if field == "username" => {
            ServiceError::Conflict("Username already exists".to_string())
        }
        StorageError::Conflict { field } if field == "email" => {
            ServiceError::Conflict("Email already exists".to_string())
        }
        other => other.into(),
    }
}

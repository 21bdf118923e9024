use super::enums::{ApprovalStatus, UserRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored account. The password hash never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub approval_status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_approved(&self) -> bool {
        self.approval_status == ApprovalStatus::Approved
    }
}

/// Values needed to insert a user; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub approval_status: ApprovalStatus,
}

impl NewUser {
    /// Admins skip the approval queue; everyone else waits for one.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let approval_status = if role == UserRole::Admin {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        };
        Self {
            username,
            email,
            password_hash,
            role,
            approval_status,
        }
    }
}

/// Public view of a user returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub approval_status: ApprovalStatus,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            approval_status: user.approval_status,
            is_approved: user.is_approved(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse::from(&user)
    }
}

//! Caller identity as seen by the services, and role checks.

use super::error::{ServiceError, ServiceResult};
use crate::models::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Fails with the required roles and the caller's role attached.
    pub fn require_role(&self, allowed: &[UserRole]) -> ServiceResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::InsufficientRole {
                required: allowed.to_vec(),
                actual: self.role,
            })
        }
    }

    /// Admins pass; everyone else must be `owner_id`.
    pub fn require_owner_or_admin(&self, owner_id: i64, message: &str) -> ServiceResult<()> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(ServiceError::forbidden(message))
        }
    }
}

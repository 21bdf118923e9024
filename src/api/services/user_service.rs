//! Admin-side account management: listing and the approval queue.

use super::error::{ServiceError, ServiceResult};
use crate::models::{ApprovalStatus, User, UserRole};
use crate::storage::StorageBackend;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct UserService {
    storage: Arc<dyn StorageBackend>,
}

impl UserService {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    /// Users newest first, optionally narrowed by role and approval status.
    pub async fn list_users(
        &self,
        role: Option<UserRole>,
        status: Option<ApprovalStatus>,
    ) -> ServiceResult<Vec<User>> {
        let users = self.storage.list_users().await?;
        Ok(users
            .into_iter()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .filter(|u| status.is_none_or(|s| u.approval_status == s))
            .collect())
    }

    pub async fn pending_users(&self) -> ServiceResult<Vec<User>> {
        self.list_users(None, Some(ApprovalStatus::Pending)).await
    }

    pub async fn approve(&self, user_id: i64) -> ServiceResult<User> {
        self.decide(user_id, ApprovalStatus::Approved).await
    }

    pub async fn reject(&self, user_id: i64) -> ServiceResult<User> {
        self.decide(user_id, ApprovalStatus::Rejected).await
    }

    async fn decide(&self, user_id: i64, status: ApprovalStatus) -> ServiceResult<User> {
        let user = self
            .storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        if user.is_approved() {
            return Err(ServiceError::validation("User is already approved"));
        }
        let user = self.storage.set_approval_status(user_id, status).await?;
        info!("User {} ({}) marked {}", user.username, user.id, status);
        Ok(user)
    }
}

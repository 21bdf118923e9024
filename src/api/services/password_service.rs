//! Password hashing with bcrypt.
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread pool.

use super::error::{ServiceError, ServiceResult};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> ServiceResult<String> {
        if password.is_empty() {
            return Err(ServiceError::validation("Password cannot be empty"));
        }
        let cost = self.cost;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// `false` for a wrong password and for a hash that cannot be parsed.
    pub async fn verify(&self, password: &str, hash: &str) -> bool {
        if password.is_empty() {
            return false;
        }
        let password = password.to_string();
        let hash = hash.to_string();
        match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                warn!("Stored password hash could not be verified: {}", e);
                false
            }
            Err(e) => {
                warn!("Password verification task failed: {}", e);
                false
            }
        }
    }
}

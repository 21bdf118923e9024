//! Storage error types for the API storage backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: i64 },
    /// Unique constraint violated on `field`
    #[error("{field} already exists")]
    Conflict { field: String },
    /// The row no longer holds the state the write was based on
    #[error("{entity} {id} was modified concurrently")]
    StaleWrite { entity: String, id: i64 },
    /// Database connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        StorageError::NotFound {
            entity: entity.to_string(),
            id,
        }
    }

    pub fn stale(entity: &str, id: i64) -> Self {
        StorageError::StaleWrite {
            entity: entity.to_string(),
            id,
        }
    }

    pub fn conflict(field: &str) -> Self {
        StorageError::Conflict {
            field: field.to_string(),
        }
    }
}

impl From<crate::models::ParseEnumError> for StorageError {
    fn from(err: crate::models::ParseEnumError) -> Self {
        StorageError::Other(format!("Corrupt row: {}", err))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StorageError::ConnectionError(err.to_string())
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                let constraint = db.constraint().unwrap_or_default();
                let field = if constraint.contains("username") {
                    "username"
                } else if constraint.contains("email") {
                    "email"
                } else {
                    "record"
                };
                StorageError::conflict(field)
            }
            _ => StorageError::Other(err.to_string()),
        }
    }
}

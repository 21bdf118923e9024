//! API error handling utilities.
//!
//! Every failure leaves the API as JSON: `{"error": ..., "status": ...}` plus
//! whatever extra fields the error carries.

use crate::services::ServiceError;
use crate::storage::StorageError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{error, warn};

/// API error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Additional top-level fields merged into the body.
    pub extras: Map<String, Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            extras: Map::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.extras.insert(key.to_string(), value);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("error".to_string(), json!(self.message));
        body.insert("status".to_string(), json!(self.status.as_u16()));
        // Extras may override `status`, e.g. "pending_approval".
        body.extend(self.extras);

        (self.status, axum::Json(Value::Object(body))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(message) => ApiError::bad_request(message),
            ServiceError::Unauthorized(message) => ApiError::unauthorized(message),
            ServiceError::Forbidden(message) => ApiError::new(StatusCode::FORBIDDEN, message),
            ServiceError::InsufficientRole { required, actual } => {
                ApiError::new(StatusCode::FORBIDDEN, "Insufficient permissions")
                    .with("required_roles", required)
                    .with("user_role", actual)
            }
            ServiceError::PendingApproval { user } => ApiError::new(
                StatusCode::FORBIDDEN,
                "Your account is pending admin approval",
            )
            .with("user", user)
            .with("status", "pending_approval"),
            ServiceError::AccountRejected => ApiError::new(
                StatusCode::FORBIDDEN,
                "Your account has been rejected. Please contact support",
            ),
            ServiceError::NotFound(message) => ApiError::new(StatusCode::NOT_FOUND, message),
            ServiceError::Conflict(message) => ApiError::new(StatusCode::CONFLICT, message),
            ServiceError::Storage(err) => err.into(),
            ServiceError::Internal(detail) => {
                error!("Internal error: {}", detail);
                ApiError::internal()
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, .. } => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{} not found", entity))
            }
            StorageError::Conflict { field } => {
                ApiError::new(StatusCode::CONFLICT, format!("{} already exists", field))
            }
            StorageError::StaleWrite { entity, id } => {
                warn!("Stale write on {} {}", entity, id);
                ApiError::new(
                    StatusCode::CONFLICT,
                    format!("{} was changed by another request, please retry", entity),
                )
            }
            other => {
                error!("Storage error: {}", other);
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected JSON body: {}", rejection.body_text());
        ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(format!("Invalid query string: {}", rejection.body_text()))
    }
}

/// `axum::Json` whose rejection is reported as an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejection is reported as an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query` whose rejection is reported as an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

pub type ApiResult<T> = Result<T, ApiError>;

/// Parse an optional JSON body; an empty body yields `T::default()`.
pub fn json_or_default<T: DeserializeOwned + Default>(body: &[u8]) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

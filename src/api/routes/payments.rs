//! Rent payment routes.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, put},
};
use serde_json::{Value, json};

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::{ApiJson, ApiPath, ApiResult, json_or_default};
use crate::models::{Payment, PaymentCompletion, PaymentRequest};

/// Create the payment router (mounted under /api)
pub fn payments_router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(record_payment))
        .route("/payments/recent", get(recent_payments))
        .route("/payments/{id}/complete", put(complete_payment))
}

fn payments_body(payments: Vec<Payment>) -> Json<Value> {
    Json(json!({
        "total": payments.len(),
        "payments": payments,
    }))
}

/// POST /api/payments - Record a rent payment
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = PaymentRequest,
    responses(
        (status = 201, description = "Payment recorded as pending", body = Object),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Caller is not a tenant"),
        (status = 404, description = "Property or lease not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(request): ApiJson<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let payment = state
        .payment_service()
        .record(auth.actor(), request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Payment recorded successfully",
            "payment": payment,
        })),
    ))
}

/// GET /api/payments - Payments visible to the caller
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    responses(
        (status = 200, description = "Payments, newest first", body = Object)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let payments = state.payment_service().list(auth.actor()).await?;
    Ok(payments_body(payments))
}

/// GET /api/payments/recent - The ten newest payments visible to the caller
#[utoipa::path(
    get,
    path = "/api/payments/recent",
    tag = "Payments",
    responses(
        (status = 200, description = "Recent payments", body = Object)
    ),
    security(("bearer_auth" = []))
)]
pub async fn recent_payments(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Value>> {
    let payments = state.payment_service().recent(auth.actor()).await?;
    Ok(payments_body(payments))
}

/// PUT /api/payments/{id}/complete - Mark a payment received
#[utoipa::path(
    put,
    path = "/api/payments/{id}/complete",
    tag = "Payments",
    params(("id" = i64, Path, description = "Payment id")),
    request_body(content = PaymentCompletion, description = "Optional"),
    responses(
        (status = 200, description = "Payment completed", body = Object),
        (status = 400, description = "Payment already completed"),
        (status = 403, description = "Caller is not the property's landlord or an admin"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_payment(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<i64>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let completion: PaymentCompletion = json_or_default(&body)?;
    let payment = state
        .payment_service()
        .complete(auth.actor(), id, completion)
        .await?;
    Ok(Json(json!({
        "message": "Payment marked as completed",
        "payment": payment,
    })))
}

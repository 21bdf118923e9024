//! API routes module - organizes all route handlers.
//!
//! Layout:
//! - /auth/*        accounts and tokens
//! - /admin/*       approval queue and analytics
//! - /api/*         properties, bookings, payments, leases, services
//! - /dashboard/*   role dashboards and profile

pub mod admin;
pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod bookings;
pub mod dashboard;
pub mod error;
pub mod leases;
pub mod openapi;
pub mod payments;
pub mod properties;
pub mod service_catalog;

use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;

pub use app_state::AppState;
pub use auth_context::AuthContext;
pub use error::{ApiError, ApiResult};

use crate::middleware::{create_cors_layer, create_trace_layer};

/// Create the main API router combining all route modules.
///
/// State is applied by [`create_app`]; tests may apply their own.
pub fn create_api_router() -> Router<AppState> {
    let api = Router::new()
        .merge(properties::properties_router())
        .merge(bookings::bookings_router())
        .merge(payments::payments_router())
        .merge(leases::leases_router())
        .merge(service_catalog::service_catalog_router());

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth::auth_router())
        .nest("/admin", admin::admin_router())
        .nest("/api", api)
        .nest("/dashboard", dashboard::dashboard_router())
        .merge(openapi::openapi_router())
}

/// The complete application: routes, state, CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors = create_cors_layer(&state.config.cors_allowed_origins);
    create_api_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(create_trace_layer())
            .layer(cors),
    )
}

/// GET /health - Unauthenticated liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = Object)
    )
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "rental-marketplace-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        crate::routes::health_check,
        // Authentication
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::refresh_token,
        crate::routes::auth::validate_token,
        crate::routes::auth::delete_account,
        // Admin
        crate::routes::admin::list_users,
        crate::routes::admin::list_pending_users,
        crate::routes::admin::approve_user,
        crate::routes::admin::reject_user,
        crate::routes::admin::analytics,
        // Properties
        crate::routes::properties::list_properties,
        crate::routes::properties::create_property,
        crate::routes::properties::get_property,
        crate::routes::properties::update_property,
        crate::routes::properties::delete_property,
        crate::routes::properties::get_property_landlord,
        crate::routes::properties::list_landlord_properties,
        // Bookings
        crate::routes::bookings::create_booking,
        crate::routes::bookings::list_bookings,
        crate::routes::bookings::get_booking,
        crate::routes::bookings::update_booking,
        // Payments
        crate::routes::payments::record_payment,
        crate::routes::payments::list_payments,
        crate::routes::payments::recent_payments,
        crate::routes::payments::complete_payment,
        // Leases
        crate::routes::leases::create_lease,
        crate::routes::leases::list_leases,
        crate::routes::leases::get_lease,
        crate::routes::leases::update_lease_status,
        // Services
        crate::routes::service_catalog::list_services,
        crate::routes::service_catalog::create_service,
        crate::routes::service_catalog::update_service,
        crate::routes::service_catalog::delete_service,
        crate::routes::service_catalog::request_service,
        crate::routes::service_catalog::list_service_bookings,
        crate::routes::service_catalog::update_service_booking,
        // Dashboard
        crate::routes::dashboard::tenant_dashboard,
        crate::routes::dashboard::landlord_dashboard,
        crate::routes::dashboard::admin_dashboard,
        crate::routes::dashboard::profile,
        crate::routes::dashboard::authenticated_health,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::UserRole,
        crate::models::ApprovalStatus,
        crate::models::BookingStatus,
        crate::models::PaymentMethod,
        crate::models::PaymentStatus,
        crate::models::LeaseStatus,
        crate::models::ServiceBookingStatus,
        crate::models::UserResponse,
        crate::models::Property,
        crate::models::PropertyDraft,
        crate::models::PropertyChanges,
        crate::models::Booking,
        crate::models::BookingRequest,
        crate::models::BookingStatusUpdate,
        crate::models::Payment,
        crate::models::PaymentRequest,
        crate::models::PaymentCompletion,
        crate::models::Lease,
        crate::models::LeaseRequest,
        crate::models::LeaseStatusUpdate,
        crate::models::Service,
        crate::models::ServiceDraft,
        crate::models::ServiceChanges,
        crate::models::ServiceBooking,
        crate::models::ServiceBookingRequest,
        crate::models::ServiceBookingStatusUpdate,
        crate::services::RegisterRequest,
        crate::services::LoginRequest,
        crate::services::TokenPair,
        crate::routes::auth::AuthResponse,
        crate::routes::auth::RefreshTokenRequest,
        crate::routes::auth::RefreshTokenResponse,
        crate::routes::auth::TokenIdentity,
        crate::routes::auth::ValidateResponse,
        crate::services::dashboard_service::TenantDashboard,
        crate::services::dashboard_service::LandlordDashboard,
        crate::services::dashboard_service::AdminDashboard,
        crate::services::dashboard_service::SystemStats,
        crate::services::dashboard_service::PropertyCounts,
        crate::services::dashboard_service::Analytics,
        crate::services::dashboard_service::PaymentTotals,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness probe"),
        (name = "Authentication", description = "Registration, login and tokens"),
        (name = "Admin", description = "Account approval and analytics"),
        (name = "Properties", description = "Property listings"),
        (name = "Bookings", description = "Rental booking requests"),
        (name = "Payments", description = "Rent payments"),
        (name = "Leases", description = "Lease agreements"),
        (name = "Services", description = "Add-on services and requests"),
        (name = "Dashboard", description = "Role dashboards and profile"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Rental Marketplace API",
        description = "REST API for property listings, bookings, leases and rent payments",
        version = "1.0.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Update version to match Cargo.toml version
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

//! Services module - business rules between the HTTP handlers and storage.

pub mod access;
pub mod auth_service;
pub mod booking_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod error;
pub mod jwt_service;
pub mod lease_service;
pub mod password_service;
pub mod payment_service;
pub mod property_service;
pub mod revocation;
pub mod user_service;

// Re-export for convenience
pub use access::Actor;
pub use auth_service::{AuthService, LoginRequest, RegisterRequest, Registration};
pub use booking_service::BookingService;
pub use catalog_service::CatalogService;
pub use dashboard_service::DashboardService;
pub use error::{ServiceError, ServiceResult};
pub use jwt_service::{Claims, JwtService, SharedJwtService, TokenPair, TokenType};
pub use lease_service::LeaseService;
pub use password_service::PasswordService;
pub use payment_service::PaymentService;
pub use property_service::{ListingFilter, PropertyService};
pub use revocation::RevokedTokens;
pub use user_service::UserService;

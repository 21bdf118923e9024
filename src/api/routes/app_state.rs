//! Application state management.
//!
//! Defines the AppState struct that holds the shared storage backend, token
//! services and configuration, plus constructors for the business services.

use crate::config::AppConfig;
use crate::services::{
    AuthService, BookingService, CatalogService, DashboardService, JwtService, LeaseService,
    PasswordService, PaymentService, PropertyService, RevokedTokens, SharedJwtService,
    UserService,
};
use crate::storage::{
    MemoryStorageBackend, PostgresStorageBackend, StorageBackend, StorageError,
};
use axum::extract::FromRef;
use std::sync::Arc;
use tracing::info;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (PostgreSQL or in-memory)
    pub storage: Arc<dyn StorageBackend>,
    pub jwt_service: SharedJwtService,
    pub passwords: PasswordService,
    /// Login sessions revoked by logout or account deletion
    pub revoked_tokens: RevokedTokens,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// State backed by the in-memory store.
    pub fn new(config: AppConfig) -> Self {
        Self::with_storage(config, Arc::new(MemoryStorageBackend::new()))
    }

    pub fn with_storage(config: AppConfig, storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            jwt_service: Arc::new(JwtService::from_config(&config)),
            passwords: PasswordService::new(config.bcrypt_cost),
            revoked_tokens: RevokedTokens::new(),
            config: Arc::new(config),
        }
    }

    /// Connect to PostgreSQL when `DATABASE_URL` is configured, otherwise
    /// fall back to the in-memory store.
    pub async fn from_config(config: AppConfig) -> Result<Self, StorageError> {
        let storage = init_storage(&config).await?;
        Ok(Self::with_storage(config, storage))
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(
            self.storage.clone(),
            self.passwords.clone(),
            self.jwt_service.clone(),
            self.revoked_tokens.clone(),
        )
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.storage.clone())
    }

    pub fn property_service(&self) -> PropertyService {
        PropertyService::new(self.storage.clone())
    }

    pub fn booking_service(&self) -> BookingService {
        BookingService::new(self.storage.clone())
    }

    pub fn payment_service(&self) -> PaymentService {
        PaymentService::new(self.storage.clone())
    }

    pub fn lease_service(&self) -> LeaseService {
        LeaseService::new(self.storage.clone())
    }

    pub fn catalog_service(&self) -> CatalogService {
        CatalogService::new(self.storage.clone())
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self.storage.clone())
    }
}

async fn init_storage(config: &AppConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    let Some(database_url) = config.database_url.as_deref() else {
        info!("DATABASE_URL not set, using in-memory storage");
        return Ok(Arc::new(MemoryStorageBackend::new()));
    };

    let pool = sqlx::PgPool::connect(database_url).await.map_err(|e| {
        StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
    })?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;

    info!("Connected to PostgreSQL, migrations applied");
    Ok(Arc::new(PostgresStorageBackend::new(pool)))
}

// Allow parts of AppState to be extracted directly (for Axum)
impl FromRef<AppState> for Arc<dyn StorageBackend> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for SharedJwtService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.jwt_service.clone()
    }
}

impl FromRef<AppState> for RevokedTokens {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.revoked_tokens.clone()
    }
}

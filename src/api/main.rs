use anyhow::Context;
use std::net::SocketAddr;
use tracing::{error, info, warn};

use rental_marketplace_api::config::AppConfig;
use rental_marketplace_api::middleware::init_tracing;
use rental_marketplace_api::routes::{AppState, create_app};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;

    // RUST_LOG controls the level (default: info), LOG_FORMAT=json for JSON lines
    init_tracing(config.log_format);
    info!("Application starting...");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    let admin = config.admin.clone();
    let state = AppState::from_config(config)
        .await
        .context("Failed to initialize storage")?;

    match admin {
        Some(admin) => match state.auth_service().bootstrap_admin(&admin).await {
            Ok(true) => info!("Admin account {} created", admin.email),
            Ok(false) => info!("Admin account {} already exists", admin.email),
            Err(e) => error!("Failed to create admin account {}: {}", admin.email, e),
        },
        None => warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set; no admin account bootstrapped"),
    }

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);
    info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM (Docker stop).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use orodha_notification_service::auth::JwtIdentityVerifier;
use orodha_notification_service::config::Settings;
use orodha_notification_service::directory::create_target_directory;
use orodha_notification_service::postgres::PostgresPool;
use orodha_notification_service::redis::RedisPool;
use orodha_notification_service::server::{create_app, AppState};
use orodha_notification_service::store::create_notification_store;
use orodha_notification_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Keep the guard alive so buffered spans are flushed on exit
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    let verifier = Arc::new(JwtIdentityVerifier::new(&settings.jwt)?);

    // PostgreSQL pool (only for the postgres store backend)
    let postgres_pool = if settings.database.backend == "postgres" {
        Some(PostgresPool::new(&settings.database).await?)
    } else {
        None
    };

    let store = create_notification_store(&settings.database, postgres_pool.as_ref()).await?;

    // Redis pool (only for the redis directory backend)
    let redis_pool = if settings.directory.backend == "redis" {
        Some(Arc::new(RedisPool::new(&settings.directory.redis_url)?))
    } else {
        None
    };

    let directory = create_target_directory(&settings.directory, redis_pool);

    let addr = settings.server_addr();
    let state = AppState::new(settings, verifier, directory, store);
    tracing::info!("Application state initialized");

    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler())
        .await?;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

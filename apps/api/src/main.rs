//! Salesdesk permission API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use salesdesk_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        if let StorageBackend::Postgres { database_url } = &config.storage_backend {
            let pool =
                api_services::connect_postgres(database_url, config.database_max_connections)
                    .await?;
            api_services::run_migrations(&pool).await?;
        }
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = api_services::build_state(&config).await?;
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, "salesdesk-api listening");
    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}

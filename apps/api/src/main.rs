//! Vendorhub API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod permissions;
mod state;

use tracing::info;
use vendorhub_core::AppError;

use crate::api_config::{ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        api_services::connect_and_migrate(database_url).await?;
        info!("database migrations applied successfully");
        return Ok(());
    }

    let app_state = api_services::build_app_state(&config).await?;
    api_services::bootstrap_super_admins(&app_state).await?;

    let app = api_router::build_router(app_state, config.frontend_url.as_str())?;
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        storage_backend = config.storage_backend.as_str(),
        "vendorhub-api listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

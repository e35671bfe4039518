//! Sanatio API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dev_seed;
mod dto;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod state;

use axum::Router;
use sanatio_core::AppError;
use tracing::{info, warn};

use crate::api_config::ApiConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let Some(app) = build_app(&config).await? else {
        info!("database migrations applied successfully");
        return Ok(());
    };

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "sanatio-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

/// Builds the router, or `None` when only migrations were requested.
async fn build_app(config: &ApiConfig) -> Result<Option<Router>, AppError> {
    let Some(database_url) = config.database_url.as_deref() else {
        if config.migrate_only {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        warn!("DATABASE_URL is not set; roles and memberships are kept in memory");
        let app_state = api_services::build_in_memory_app_state(config)?;
        if config.dev_seed {
            dev_seed::run(&app_state).await?;
        }

        return api_router::build_router(
            app_state,
            &config.frontend_url,
            api_services::build_memory_session_layer(config.cookie_secure),
        )
        .map(Some);
    };

    let pool = api_services::connect_and_migrate(database_url).await?;
    if config.migrate_only {
        return Ok(None);
    }

    let app_state = api_services::build_postgres_app_state(pool.clone(), config)?;
    if config.dev_seed {
        dev_seed::run(&app_state).await?;
    }

    let session_layer =
        api_services::build_postgres_session_layer(pool, config.cookie_secure).await?;
    api_router::build_router(app_state, &config.frontend_url, session_layer).map(Some)
}

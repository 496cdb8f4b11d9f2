// src/main.rs
use std::sync::Arc;

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use offerdesk_backend::config::{AppConfig, StorageBackend};
use offerdesk_backend::database;
use offerdesk_backend::routes::build_app;
use offerdesk_backend::server::{bind_listener, PORT_FALLBACK_RANGE};
use offerdesk_backend::services::notifier::{LogNotifier, Notifier, SmtpNotifier};
use offerdesk_backend::state::AppState;
use offerdesk_backend::store::{InMemoryRepository, PgRepository, Repository};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return;
        }
    };

    let repo: Arc<dyn Repository> = match config.storage {
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            let pool = match database::create_pool(url, config.database_max_connections).await {
                Ok(p) => p,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create database pool");
                    return;
                }
            };
            // Schema must be current before any request is served
            if let Err(e) = database::run_migrations(&pool).await {
                tracing::error!(error = %e, "Failed to run migrations");
                return;
            }
            Arc::new(PgRepository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store, data is lost on restart");
            Arc::new(InMemoryRepository::new())
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => match SmtpNotifier::new(smtp) {
            Ok(n) => Arc::new(n),
            Err(e) => {
                tracing::error!(error = %e, "Failed to configure SMTP");
                return;
            }
        },
        None => Arc::new(LogNotifier),
    };

    tracing::info!(copy_mode = ?config.copy_mode, storage = ?config.storage, "Starting offer service");
    let app_state = AppState::new(repo, notifier, config.jwt_secret.as_str(), config.copy_mode);
    let app = build_app(app_state);

    let listener = match bind_listener(config.host, config.port, PORT_FALLBACK_RANGE).await {
        Ok((listener, addr)) => {
            tracing::info!(%addr, "Offer service listening");
            listener
        }
        Err(e) => {
            tracing::error!(host = %config.host, port = config.port, error = %e, "No port available");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error=%e, "Server error");
    }
}

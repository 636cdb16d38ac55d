//! # MAESTRO Notifier Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts
//! the notification scheduler, and serves the internal HTTP endpoints.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod database;
mod delivery;
mod messages;
mod services;
mod utils;

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::store::{NotificationStore, SqliteNotificationStore};
use crate::delivery::telegram::{DisabledGateway, TelegramGateway};
use crate::delivery::DeliveryGateway;
use crate::services::api::ApiService;
use crate::services::notifier::NotifierService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maestro_notifier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting MAESTRO notifier v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, Interval: {}min",
        config.database_url, config.http_port, config.poll_interval_minutes
    );

    // Initialize database
    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db = Arc::new(db_manager);
    info!("Database initialized successfully");

    // Initialize delivery gateway; a missing token disables delivery but
    // keeps the rest of the service (and its health surface) running.
    let gateway: Arc<dyn DeliveryGateway> = match &config.telegram_bot_token {
        Some(token) => {
            info!("Telegram transport configured");
            Arc::new(TelegramGateway::new(token))
        }
        None => {
            warn!("TELEGRAM_BOT_TOKEN not set - running with notifications disabled");
            Arc::new(DisabledGateway)
        }
    };

    let store: Arc<dyn NotificationStore> = Arc::new(SqliteNotificationStore::new(db.as_ref()));

    // Initialize and start the notification scheduler
    info!("Initializing notification service...");
    let mut notifier = NotifierService::new(
        store.clone(),
        gateway.clone(),
        config.poll_interval_minutes,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create notification service: {}", e))?;

    notifier
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start notification service: {}", e))?;

    // Internal HTTP surface: health probes + admin announce trigger
    let api = ApiService::new(db.clone(), store, gateway);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("HTTP server starting on port {}", config.http_port);

    let server_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, api.router).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    // Run until the server dies or we receive a shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = server_task => {
            if let Err(e) = result {
                tracing::error!("HTTP server task error: {}", e);
            }
        }
    }

    // Stop the scheduler on shutdown; in-flight broadcasts finish before
    // their flag writes, so an aborted tick never marks unsent events.
    if let Err(e) = notifier.stop().await {
        tracing::warn!("Error stopping notification service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}

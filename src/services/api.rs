use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabaseManager;
use crate::database::store::NotificationStore;
use crate::delivery::DeliveryGateway;
use crate::messages;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

/// Result of a manual event announcement.
#[derive(Debug, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub ok: bool,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub store: Arc<dyn NotificationStore>,
    pub gateway: Arc<dyn DeliveryGateway>,
    pub start_time: DateTime<Utc>,
}

/// Internal HTTP surface: health probes plus the admin announce trigger.
pub struct ApiService {
    pub router: Router,
}

impl ApiService {
    pub fn new(
        db: Arc<DatabaseManager>,
        store: Arc<dyn NotificationStore>,
        gateway: Arc<dyn DeliveryGateway>,
    ) -> Self {
        let state = AppState {
            db,
            store,
            gateway,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .route("/events/:id/notify", post(notify_event))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();

    let db_status = match state.db.ping().await {
        Ok(()) => "healthy",
        Err(_) => "unhealthy",
    };

    let response_time_ms = start.elapsed().as_millis() as u64;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds() as u64;

    let health_response = HealthResponse {
        status: db_status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: db_status.to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
        },
        uptime_seconds: uptime,
    };

    if health_response.status == "healthy" {
        Ok(Json(health_response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    match state.db.ping().await {
        Ok(()) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

/// Broadcasts an announcement for one event to every linked recipient,
/// independent of the scheduler's threshold flags.
async fn notify_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NotifyResponse>, StatusCode> {
    let event = state.store.get_event(&id).await.map_err(|e| {
        tracing::error!("Failed to load event {}: {}", id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    let Some(event) = event else {
        return Err(StatusCode::NOT_FOUND);
    };

    let recipients = state.store.list_recipient_identities().await.map_err(|e| {
        tracing::error!("Failed to load recipients: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let text = messages::announcement(&event);
    let report = state.gateway.broadcast(&recipients, &text).await;
    tracing::info!(
        "Announced event {} to {} recipients ({} failed)",
        event.id,
        report.sent,
        report.failed
    );

    Ok(Json(NotifyResponse {
        ok: true,
        sent: report.sent,
        failed: report.failed,
    }))
}

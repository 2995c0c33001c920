//! System endpoints: health check and schema bootstrap.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::MessageResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, WatchError};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    open_sessions: usize,
    ws_clients: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, open session and WebSocket client counts, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_sessions: state.monitor_service.sessions().len().await,
            ws_clients: state.event_bus.receiver_count(),
        }),
    )
}

/// `POST /api/init-db` — Create tables and seed the settings row.
///
/// # Errors
///
/// Returns [`WatchError::PersistenceError`] if the bootstrap fails.
#[utoipa::path(
    post,
    path = "/api/init-db",
    tag = "System",
    summary = "Initialize database",
    description = "Creates the routes, travel_times and user_settings tables if missing and seeds the default settings. Safe to call repeatedly.",
    responses(
        (status = 200, description = "Database ready", body = MessageResponse),
        (status = 500, description = "Bootstrap failed", body = ErrorResponse),
    )
)]
pub async fn init_db(State(state): State<AppState>) -> Result<impl IntoResponse, WatchError> {
    state.route_service.initialize().await?;
    Ok(Json(MessageResponse::new("database initialized")))
}

/// `POST /init-db`, mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/init-db", post(init_db))
}

/// System routes mounted at the root level (not under `/api`).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

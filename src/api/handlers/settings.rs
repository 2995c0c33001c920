//! Settings handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::SettingsRequest;
use crate::app_state::AppState;
use crate::domain::UserSettings;
use crate::error::{ErrorResponse, WatchError};

/// `GET /settings` — Read the settings record.
///
/// # Errors
///
/// Returns [`WatchError`] on persistence failure.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    summary = "Get settings",
    responses(
        (status = 200, description = "Current settings", body = UserSettings),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    )
)]
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, WatchError> {
    let settings = state.route_service.get_settings().await?;
    Ok(Json(settings))
}

/// `PUT /settings` — Replace the settings record.
///
/// # Errors
///
/// Returns [`WatchError::InvalidRequest`] for out-of-range minutes or
/// [`WatchError::InvalidIntervals`] for a malformed window list.
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    summary = "Replace settings",
    description = "Replaces preparation time, query frequency and monitoring windows. Sessions already monitoring keep their period until restarted.",
    request_body = SettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = UserSettings),
        (status = 400, description = "Invalid settings", body = ErrorResponse),
    )
)]
pub async fn replace_settings(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let settings = state.route_service.replace_settings(&req.into()).await?;
    Ok(Json(settings))
}

/// Settings resource routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(replace_settings))
}

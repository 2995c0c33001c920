//! Travel-time sample handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::AppendSampleRequest;
use crate::app_state::AppState;
use crate::domain::TravelTimeSample;
use crate::error::{ErrorResponse, WatchError};

/// `POST /travel-times` — Append a sample to a route.
///
/// # Errors
///
/// Returns [`WatchError::InvalidRequest`] for negative measurements or
/// [`WatchError::RouteNotFound`] if the route does not exist.
#[utoipa::path(
    post,
    path = "/api/travel-times",
    tag = "Travel times",
    summary = "Append a sample",
    description = "Stores one travel-time observation. The capture timestamp is assigned by the server.",
    request_body = AppendSampleRequest,
    responses(
        (status = 201, description = "Sample stored", body = TravelTimeSample),
        (status = 400, description = "Invalid sample", body = ErrorResponse),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn append_sample(
    State(state): State<AppState>,
    Json(req): Json<AppendSampleRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let sample = state.route_service.append_sample(&req.into()).await?;
    Ok((StatusCode::CREATED, Json(sample)))
}

/// Sample resource routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/travel-times", post(append_sample))
}

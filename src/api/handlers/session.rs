//! Monitoring session handlers: open, inspect, drive, close.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{MessageResponse, SelectRouteRequest, StartRequest};
use crate::app_state::AppState;
use crate::domain::SessionId;
use crate::error::{ErrorResponse, WatchError};
use crate::monitor::SessionSnapshot;

/// `POST /sessions` — Open an idle monitoring session.
///
/// # Errors
///
/// Returns [`WatchError`] on an internal failure.
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Sessions",
    summary = "Open a session",
    description = "Creates an idle session with no route selected.",
    responses(
        (status = 201, description = "Session opened", body = SessionSnapshot),
    )
)]
pub async fn open_session(State(state): State<AppState>) -> Result<impl IntoResponse, WatchError> {
    let snapshot = state.monitor_service.open_session().await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// `GET /sessions/{id}` — Session snapshot.
///
/// # Errors
///
/// Returns [`WatchError::SessionNotFound`] if the session does not exist.
#[utoipa::path(
    get,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    summary = "Get a session",
    description = "Returns the session's state, displayed route, aggregates, chart and recent samples.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, WatchError> {
    let snapshot = state
        .monitor_service
        .snapshot(SessionId::from_uuid(id))
        .await?;
    Ok(Json(snapshot))
}

/// `DELETE /sessions/{id}` — Close a session.
///
/// # Errors
///
/// Returns [`WatchError::SessionNotFound`] if the session does not exist.
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    tag = "Sessions",
    summary = "Close a session",
    description = "Stops monitoring, if running, and forgets the session.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session closed", body = MessageResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, WatchError> {
    state
        .monitor_service
        .close_session(SessionId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse::new(format!("session {id} closed"))))
}

/// `PUT /sessions/{id}/route` — Display a route.
///
/// # Errors
///
/// Returns [`WatchError::SessionNotFound`] or [`WatchError::RouteNotFound`].
#[utoipa::path(
    put,
    path = "/api/sessions/{id}/route",
    tag = "Sessions",
    summary = "Select a route",
    description = "Displays the route and loads its history. A running schedule is stopped first; the session ends up idle.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    request_body = SelectRouteRequest,
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 404, description = "Session or route not found", body = ErrorResponse),
    )
)]
pub async fn select_route(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SelectRouteRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let snapshot = state
        .monitor_service
        .select_route(SessionId::from_uuid(id), req.route_id)
        .await?;
    Ok(Json(snapshot))
}

/// `POST /sessions/{id}/start` — Start monitoring.
///
/// # Errors
///
/// Returns [`WatchError::SessionNotFound`], [`WatchError::RouteNotFound`],
/// or [`WatchError::InvalidRequest`] if no route is given or displayed.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/start",
    tag = "Sessions",
    summary = "Start monitoring",
    description = "Queries the distance provider immediately and then once per configured query frequency. Switches route first when `routeId` names another one.",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    request_body = StartRequest,
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 400, description = "No route selected", body = ErrorResponse),
        (status = 404, description = "Session or route not found", body = ErrorResponse),
    )
)]
pub async fn start_monitoring(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<StartRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let snapshot = state
        .monitor_service
        .start(SessionId::from_uuid(id), req.route_id)
        .await?;
    Ok(Json(snapshot))
}

/// `POST /sessions/{id}/stop` — Stop monitoring.
///
/// # Errors
///
/// Returns [`WatchError::SessionNotFound`] if the session does not exist.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/stop",
    tag = "Sessions",
    summary = "Stop monitoring",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn stop_monitoring(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, WatchError> {
    let snapshot = state.monitor_service.stop(SessionId::from_uuid(id)).await?;
    Ok(Json(snapshot))
}

/// `POST /sessions/{id}/refresh` — Reload the displayed history.
///
/// # Errors
///
/// Returns [`WatchError::SessionNotFound`], or
/// [`WatchError::InvalidRequest`] if no route is displayed.
#[utoipa::path(
    post,
    path = "/api/sessions/{id}/refresh",
    tag = "Sessions",
    summary = "Refresh history",
    params(
        ("id" = uuid::Uuid, Path, description = "Session UUID"),
    ),
    responses(
        (status = 200, description = "Session snapshot", body = SessionSnapshot),
        (status = 400, description = "No route selected", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn refresh_history(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, WatchError> {
    let snapshot = state
        .monitor_service
        .refresh(SessionId::from_uuid(id))
        .await?;
    Ok(Json(snapshot))
}

/// Session resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/{id}", get(get_session).delete(close_session))
        .route("/sessions/{id}/route", put(select_route))
        .route("/sessions/{id}/start", post(start_monitoring))
        .route("/sessions/{id}/stop", post(stop_monitoring))
        .route("/sessions/{id}/refresh", post(refresh_history))
}

//! Route handlers: CRUD, toggle, history and analysis.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{LimitParams, MessageResponse, RouteListParams, RouteRequest, ToggleRequest};
use crate::app_state::AppState;
use crate::domain::{Route, RouteId, TravelTimeSample};
use crate::error::{ErrorResponse, WatchError};
use crate::service::RouteAnalysis;

/// `GET /routes` — List saved routes, newest first.
///
/// # Errors
///
/// Returns [`WatchError`] on persistence failure.
#[utoipa::path(
    get,
    path = "/api/routes",
    tag = "Routes",
    summary = "List routes",
    description = "Returns every saved route ordered by creation time, newest first. Pass `active=true` to hide inactive routes.",
    params(RouteListParams),
    responses(
        (status = 200, description = "Route list", body = Vec<Route>),
        (status = 500, description = "Persistence failure", body = ErrorResponse),
    )
)]
pub async fn list_routes(
    State(state): State<AppState>,
    Query(params): Query<RouteListParams>,
) -> Result<impl IntoResponse, WatchError> {
    let routes = state.route_service.list_routes(params.active).await?;
    Ok(Json(routes))
}

/// `POST /routes` — Create a route.
///
/// # Errors
///
/// Returns [`WatchError::InvalidRequest`] if a field is blank or too long.
#[utoipa::path(
    post,
    path = "/api/routes",
    tag = "Routes",
    summary = "Create a route",
    description = "Stores a new active route. Origin and destination are free text passed to the distance provider as-is.",
    request_body = RouteRequest,
    responses(
        (status = 201, description = "Route created", body = Route),
        (status = 400, description = "Invalid route", body = ErrorResponse),
    )
)]
pub async fn create_route(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let route = state.route_service.create_route(&req.into()).await?;
    Ok((StatusCode::CREATED, Json(route)))
}

/// `GET /routes/{id}` — Get one route.
///
/// # Errors
///
/// Returns [`WatchError::RouteNotFound`] if the route does not exist.
#[utoipa::path(
    get,
    path = "/api/routes/{id}",
    tag = "Routes",
    summary = "Get a route",
    params(
        ("id" = i32, Path, description = "Route id"),
    ),
    responses(
        (status = 200, description = "Route", body = Route),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> Result<impl IntoResponse, WatchError> {
    let route = state.route_service.get_route(id).await?;
    Ok(Json(route))
}

/// `PUT /routes/{id}` — Replace a route's name and locations.
///
/// # Errors
///
/// Returns [`WatchError::InvalidRequest`] or [`WatchError::RouteNotFound`].
#[utoipa::path(
    put,
    path = "/api/routes/{id}",
    tag = "Routes",
    summary = "Update a route",
    description = "Replaces name, origin and destination. Sessions displaying the route use the new locations from their next tick.",
    params(
        ("id" = i32, Path, description = "Route id"),
    ),
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Updated route", body = Route),
        (status = 400, description = "Invalid route", body = ErrorResponse),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
    Json(req): Json<RouteRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let route = state.route_service.update_route(id, &req.into()).await?;
    Ok(Json(route))
}

/// `DELETE /routes/{id}` — Delete a route and all of its samples.
///
/// # Errors
///
/// Returns [`WatchError::RouteNotFound`] if the route does not exist.
#[utoipa::path(
    delete,
    path = "/api/routes/{id}",
    tag = "Routes",
    summary = "Delete a route",
    description = "Deletes the route and, by cascade, its samples. Sessions monitoring it are stopped.",
    params(
        ("id" = i32, Path, description = "Route id"),
    ),
    responses(
        (status = 200, description = "Route deleted", body = MessageResponse),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
) -> Result<impl IntoResponse, WatchError> {
    state.route_service.delete_route(id).await?;
    Ok(Json(MessageResponse::new(format!("route {id} deleted"))))
}

/// `PATCH /routes/{id}/toggle` — Set a route's active flag.
///
/// # Errors
///
/// Returns [`WatchError::RouteNotFound`] if the route does not exist.
#[utoipa::path(
    patch,
    path = "/api/routes/{id}/toggle",
    tag = "Routes",
    summary = "Toggle a route",
    params(
        ("id" = i32, Path, description = "Route id"),
    ),
    request_body = ToggleRequest,
    responses(
        (status = 200, description = "Updated route", body = Route),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn toggle_route(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
    Json(req): Json<ToggleRequest>,
) -> Result<impl IntoResponse, WatchError> {
    let route = state.route_service.toggle_route(id, req.is_active).await?;
    Ok(Json(route))
}

/// `GET /routes/{id}/travel-times` — List a route's samples.
///
/// # Errors
///
/// Returns [`WatchError::RouteNotFound`] if the route does not exist.
#[utoipa::path(
    get,
    path = "/api/routes/{id}/travel-times",
    tag = "Routes",
    summary = "List travel-time samples",
    description = "Returns the route's samples newest first, at most `limit` of them (default 100, max 1000).",
    params(
        ("id" = i32, Path, description = "Route id"),
        LimitParams,
    ),
    responses(
        (status = 200, description = "Samples, newest first", body = Vec<TravelTimeSample>),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn list_travel_times(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, WatchError> {
    let samples = state.route_service.list_samples(id, params.limit).await?;
    Ok(Json(samples))
}

/// `GET /routes/{id}/analysis` — Aggregates and chart data.
///
/// # Errors
///
/// Returns [`WatchError::RouteNotFound`] if the route does not exist.
#[utoipa::path(
    get,
    path = "/api/routes/{id}/analysis",
    tag = "Routes",
    summary = "Analyse a route",
    description = "Computes average, minimum and maximum duration in minutes plus a chronological chart over the newest samples.",
    params(
        ("id" = i32, Path, description = "Route id"),
        LimitParams,
    ),
    responses(
        (status = 200, description = "Analysis", body = RouteAnalysis),
        (status = 404, description = "Route not found", body = ErrorResponse),
    )
)]
pub async fn route_analysis(
    State(state): State<AppState>,
    Path(id): Path<RouteId>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse, WatchError> {
    let analysis = state.route_service.analysis(id, params.limit).await?;
    Ok(Json(analysis))
}

/// Route resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/routes", get(list_routes).post(create_route))
        .route(
            "/routes/{id}",
            get(get_route).put(update_route).delete(delete_route),
        )
        .route("/routes/{id}/toggle", patch(toggle_route))
        .route("/routes/{id}/travel-times", get(list_travel_times))
        .route("/routes/{id}/analysis", get(route_analysis))
}

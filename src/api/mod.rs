//! REST API layer: route handlers, DTOs, OpenAPI document, and router
//! composition.
//!
//! Resource endpoints are mounted under `/api`; `/health`, `/ws` and the
//! OpenAPI document live at the root.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Upper bound on a single HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Path the OpenAPI document is served at.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "travel-watch",
        description = "Saved routes, travel-time samples, and live monitoring sessions."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::init_db,
        handlers::route::list_routes,
        handlers::route::create_route,
        handlers::route::get_route,
        handlers::route::update_route,
        handlers::route::delete_route,
        handlers::route::toggle_route,
        handlers::route::list_travel_times,
        handlers::route::route_analysis,
        handlers::sample::append_sample,
        handlers::settings::get_settings,
        handlers::settings::replace_settings,
        handlers::session::open_session,
        handlers::session::get_session,
        handlers::session::close_session,
        handlers::session::select_route,
        handlers::session::start_monitoring,
        handlers::session::stop_monitoring,
        handlers::session::refresh_history,
    ),
    tags(
        (name = "System", description = "Health and schema bootstrap"),
        (name = "Routes", description = "Saved origin/destination pairs"),
        (name = "Travel times", description = "Stored travel-time samples"),
        (name = "Settings", description = "Preparation time, query frequency, monitoring windows"),
        (name = "Sessions", description = "Live monitoring sessions"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, OpenAPI, and the HTTP
/// middleware stack.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .merge(docs_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(timeout_layer()),
        )
        .with_state(state)
}

/// Answers `408 Request Timeout` once a request runs past [`REQUEST_TIMEOUT`].
fn timeout_layer() -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMEOUT)
}

#[cfg(feature = "swagger-ui")]
fn docs_router() -> Router<AppState> {
    Router::new()
        .merge(utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()))
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_router() -> Router<AppState> {
    Router::new().route(OPENAPI_PATH, get(|| async { axum::Json(ApiDoc::openapi()) }))
}

//! REST endpoint handlers organized by resource.

pub mod route;
pub mod sample;
pub mod session;
pub mod settings;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(route::routes())
        .merge(sample::routes())
        .merge(settings::routes())
        .merge(session::routes())
        .merge(system::api_routes())
}

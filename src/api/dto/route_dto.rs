//! Route DTOs for create, update, list and toggle.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::RouteDraft;

/// Request body for `POST /routes` and `PUT /routes/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    /// Display label.
    pub name: String,
    /// Start location passed verbatim to the distance provider.
    pub origin: String,
    /// End location passed verbatim to the distance provider.
    pub destination: String,
}

impl From<RouteRequest> for RouteDraft {
    fn from(req: RouteRequest) -> Self {
        Self::new(req.name, req.origin, req.destination)
    }
}

/// Request body for `PATCH /routes/{id}/toggle`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    /// New active flag.
    pub is_active: bool,
}

/// Query parameters for `GET /routes`.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteListParams {
    /// When `true`, only active routes are returned.
    #[serde(default)]
    pub active: bool,
}

//! Monitoring session DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::RouteId;

/// Request body for `PUT /sessions/{id}/route`.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectRouteRequest {
    /// Route to display.
    pub route_id: RouteId,
}

/// Request body for `POST /sessions/{id}/start`.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    /// Route to monitor; the displayed route when omitted.
    #[serde(default)]
    pub route_id: Option<RouteId>,
}

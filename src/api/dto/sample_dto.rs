//! Travel-time sample DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{NewSample, RouteId};

/// Request body for `POST /travel-times`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendSampleRequest {
    /// Route the sample belongs to.
    pub route_id: RouteId,
    /// Free-flow duration in seconds.
    pub duration_seconds: i32,
    /// Traffic-aware duration in seconds.
    #[serde(default)]
    pub duration_in_traffic_seconds: Option<i32>,
    /// Route length in meters.
    pub distance_meters: i32,
    /// Optional free-text traffic tag.
    #[serde(default)]
    pub traffic_condition: Option<String>,
}

impl From<AppendSampleRequest> for NewSample {
    fn from(req: AppendSampleRequest) -> Self {
        Self {
            route_id: req.route_id,
            duration_seconds: req.duration_seconds,
            duration_in_traffic_seconds: req.duration_in_traffic_seconds,
            distance_meters: req.distance_meters,
            traffic_condition: req.traffic_condition,
        }
    }
}

//! Travel-time samples: one provider observation for a route.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RouteId;
use crate::error::WatchError;

/// Maximum length of the free-text traffic tag.
pub const MAX_TRAFFIC_CONDITION_LEN: usize = 50;

/// A stored travel-time sample from the `travel_times` table.
///
/// Samples are immutable: there is no update path, only append and the
/// cascade delete that follows removing their route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TravelTimeSample {
    /// Server-assigned identifier.
    pub id: i32,
    /// Route the sample belongs to.
    pub route_id: RouteId,
    /// Capture timestamp, assigned at insertion.
    pub query_datetime: DateTime<Utc>,
    /// Free-flow duration estimate in seconds.
    pub duration_seconds: i32,
    /// Traffic-aware duration in seconds, when the provider returned one.
    pub duration_in_traffic_seconds: Option<i32>,
    /// Route length in meters.
    pub distance_meters: i32,
    /// Optional free-text traffic tag.
    pub traffic_condition: Option<String>,
}

/// A sample waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSample {
    /// Route the sample belongs to.
    pub route_id: RouteId,
    /// Free-flow duration estimate in seconds.
    pub duration_seconds: i32,
    /// Traffic-aware duration in seconds.
    pub duration_in_traffic_seconds: Option<i32>,
    /// Route length in meters.
    pub distance_meters: i32,
    /// Optional free-text traffic tag.
    pub traffic_condition: Option<String>,
}

impl NewSample {
    /// Rejects negative measurements and overlong traffic tags.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] describing the first
    /// violation.
    pub fn validate(&self) -> Result<(), WatchError> {
        if self.duration_seconds < 0 {
            return Err(WatchError::InvalidRequest(
                "durationSeconds must be non-negative".to_string(),
            ));
        }
        if self.duration_in_traffic_seconds.is_some_and(|s| s < 0) {
            return Err(WatchError::InvalidRequest(
                "durationInTrafficSeconds must be non-negative".to_string(),
            ));
        }
        if self.distance_meters < 0 {
            return Err(WatchError::InvalidRequest(
                "distanceMeters must be non-negative".to_string(),
            ));
        }
        if let Some(tag) = &self.traffic_condition
            && tag.chars().count() > MAX_TRAFFIC_CONDITION_LEN
        {
            return Err(WatchError::InvalidRequest(format!(
                "trafficCondition exceeds {MAX_TRAFFIC_CONDITION_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Clamps a requested history size to `1..=1000`, defaulting to 100.
#[must_use]
pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(100).clamp(1, 1000)
}

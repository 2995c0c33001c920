//! Settings DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::SettingsUpdate;

/// Request body for `PUT /settings`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    /// Minutes needed to get ready before leaving (0..=120).
    pub preparation_minutes: i32,
    /// Minutes between monitoring ticks (1..=60).
    pub query_frequency_minutes: i32,
    /// Comma-separated `HH:MM-HH:MM` windows.
    #[serde(default)]
    pub monitoring_intervals: String,
}

impl From<SettingsRequest> for SettingsUpdate {
    fn from(req: SettingsRequest) -> Self {
        Self {
            preparation_minutes: req.preparation_minutes,
            query_frequency_minutes: req.query_frequency_minutes,
            monitoring_intervals: req.monitoring_intervals,
        }
    }
}

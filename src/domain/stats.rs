//! Summary statistics and chart projection over a route's loaded samples.
//!
//! Every function takes samples in repository order (newest first), which
//! is how the history reload returns them.

use serde::Serialize;
use utoipa::ToSchema;

use super::TravelTimeSample;

/// Maximum number of points in a chart series.
pub const CHART_POINT_LIMIT: usize = 50;

/// Maximum number of entries in the recent-samples list.
pub const RECENT_LIMIT: usize = 20;

/// Mean, minimum and maximum free-flow duration in whole minutes.
///
/// All three are `0` for an empty sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Aggregates {
    /// `round(mean(duration_seconds) / 60)`.
    pub average_minutes: i64,
    /// `round(min(duration_seconds) / 60)`.
    pub min_minutes: i64,
    /// `round(max(duration_seconds) / 60)`.
    pub max_minutes: i64,
}

/// One chart point, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChartPoint {
    /// Capture time as `HH:MM` (UTC).
    pub time: String,
    /// Free-flow duration in minutes.
    pub duration_minutes: i64,
    /// Traffic-aware duration in minutes.
    pub duration_in_traffic_minutes: Option<i64>,
}

/// Chronological chart data for one route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChartSeries {
    /// At most [`CHART_POINT_LIMIT`] points, oldest first.
    pub points: Vec<ChartPoint>,
    /// Whether any visible point carries a traffic duration.
    pub show_traffic: bool,
}

/// A recent sample formatted for a history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RecentSample {
    /// Sample identifier.
    pub id: i32,
    /// Capture time as `dd/mm/YYYY HH:MM` (UTC).
    pub captured_at: String,
    /// Free-flow duration in minutes.
    pub duration_minutes: i64,
    /// Traffic-aware duration in minutes.
    pub duration_in_traffic_minutes: Option<i64>,
}

/// Computes [`Aggregates`] over every loaded sample.
#[must_use]
pub fn aggregates(samples: &[TravelTimeSample]) -> Aggregates {
    let durations = samples.iter().map(|s| i64::from(s.duration_seconds));
    let (Some(min), Some(max)) = (durations.clone().min(), durations.clone().max()) else {
        return Aggregates::default();
    };
    let total: i64 = durations.sum();

    #[allow(clippy::cast_precision_loss)]
    let mean_seconds = total as f64 / samples.len() as f64;

    Aggregates {
        average_minutes: round_minutes(mean_seconds),
        min_minutes: seconds_to_minutes(min),
        max_minutes: seconds_to_minutes(max),
    }
}

/// Projects the newest [`CHART_POINT_LIMIT`] samples into chronological
/// chart points.
#[must_use]
pub fn chart_series(samples: &[TravelTimeSample]) -> ChartSeries {
    let points: Vec<ChartPoint> = samples
        .iter()
        .take(CHART_POINT_LIMIT)
        .rev()
        .map(|s| ChartPoint {
            time: s.query_datetime.format("%H:%M").to_string(),
            duration_minutes: seconds_to_minutes(i64::from(s.duration_seconds)),
            duration_in_traffic_minutes: s
                .duration_in_traffic_seconds
                .map(|t| seconds_to_minutes(i64::from(t))),
        })
        .collect();
    let show_traffic = points.iter().any(|p| p.duration_in_traffic_minutes.is_some());
    ChartSeries {
        points,
        show_traffic,
    }
}

/// Formats the newest [`RECENT_LIMIT`] samples, newest first.
#[must_use]
pub fn recent_samples(samples: &[TravelTimeSample]) -> Vec<RecentSample> {
    samples
        .iter()
        .take(RECENT_LIMIT)
        .map(|s| RecentSample {
            id: s.id,
            captured_at: s.query_datetime.format("%d/%m/%Y %H:%M").to_string(),
            duration_minutes: seconds_to_minutes(i64::from(s.duration_seconds)),
            duration_in_traffic_minutes: s
                .duration_in_traffic_seconds
                .map(|t| seconds_to_minutes(i64::from(t))),
        })
        .collect()
}

/// Converts seconds to minutes, rounding half up.
#[must_use]
pub fn seconds_to_minutes(seconds: i64) -> i64 {
    #[allow(clippy::cast_precision_loss)]
    round_minutes(seconds as f64)
}

fn round_minutes(seconds: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let minutes = (seconds / 60.0 + 0.5).floor() as i64;
    minutes
}

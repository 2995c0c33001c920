//! Database row shapes and their conversion into domain records.

use chrono::{DateTime, Utc};

use crate::domain::{Route, RouteId, TravelTimeSample, UserSettings};

/// A `routes` row.
pub type RouteRow = (i32, String, String, String, bool, DateTime<Utc>, DateTime<Utc>);

/// A `travel_times` row.
pub type SampleRow = (
    i32,
    i32,
    DateTime<Utc>,
    i32,
    Option<i32>,
    i32,
    Option<String>,
);

/// A `user_settings` row.
pub type SettingsRow = (i32, i32, String, DateTime<Utc>, DateTime<Utc>);

/// Converts a `routes` row.
#[must_use]
pub fn route_from_row(row: RouteRow) -> Route {
    let (id, name, origin, destination, is_active, created_at, updated_at) = row;
    Route {
        id: RouteId::new(id),
        name,
        origin,
        destination,
        is_active,
        created_at,
        updated_at,
    }
}

/// Converts a `travel_times` row.
#[must_use]
pub fn sample_from_row(row: SampleRow) -> TravelTimeSample {
    let (
        id,
        route_id,
        query_datetime,
        duration_seconds,
        duration_in_traffic_seconds,
        distance_meters,
        traffic_condition,
    ) = row;
    TravelTimeSample {
        id,
        route_id: RouteId::new(route_id),
        query_datetime,
        duration_seconds,
        duration_in_traffic_seconds,
        distance_meters,
        traffic_condition,
    }
}

/// Converts a `user_settings` row.
#[must_use]
pub fn settings_from_row(row: SettingsRow) -> UserSettings {
    let (preparation_minutes, query_frequency_minutes, monitoring_intervals, created_at, updated_at) =
        row;
    UserSettings {
        preparation_minutes,
        query_frequency_minutes,
        monitoring_intervals,
        created_at,
        updated_at,
    }
}

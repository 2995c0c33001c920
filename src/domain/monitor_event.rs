//! Domain events emitted by monitoring sessions.
//!
//! Every session transition and every applied history reload emits a
//! [`MonitorEvent`] through the [`super::EventBus`]. Events are forwarded
//! to WebSocket clients subscribed to the event's route.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stats::Aggregates;
use super::{RouteId, SessionId};

/// Domain event emitted by a monitoring session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A session now displays a route.
    RouteSelected {
        /// Session identifier.
        session_id: SessionId,
        /// Newly selected route.
        route_id: RouteId,
        /// Number of samples loaded for the route.
        sample_count: usize,
        /// Selection timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A session entered the monitoring state.
    MonitoringStarted {
        /// Session identifier.
        session_id: SessionId,
        /// Monitored route.
        route_id: RouteId,
        /// Seconds between ticks.
        period_secs: u64,
        /// Start timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A session returned to idle.
    MonitoringStopped {
        /// Session identifier.
        session_id: SessionId,
        /// Route that was monitored.
        route_id: RouteId,
        /// Stop timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A tick stored a new sample.
    SampleRecorded {
        /// Session identifier.
        session_id: SessionId,
        /// Route the sample belongs to.
        route_id: RouteId,
        /// Stored sample id.
        sample_id: i32,
        /// Free-flow duration in seconds.
        duration_seconds: i32,
        /// Traffic-aware duration in seconds.
        duration_in_traffic_seconds: Option<i32>,
        /// Route length in meters.
        distance_meters: i32,
        /// Capture timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A session applied a reloaded history and recomputed aggregates.
    HistoryRefreshed {
        /// Session identifier.
        session_id: SessionId,
        /// Displayed route.
        route_id: RouteId,
        /// Number of loaded samples.
        sample_count: usize,
        /// Recomputed aggregates.
        aggregates: Aggregates,
        /// Refresh timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A session was closed while displaying a route.
    SessionClosed {
        /// Session identifier.
        session_id: SessionId,
        /// Route the session was displaying.
        route_id: RouteId,
        /// Close timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MonitorEvent {
    /// Returns the route ID associated with this event.
    #[must_use]
    pub fn route_id(&self) -> RouteId {
        match self {
            Self::RouteSelected { route_id, .. }
            | Self::MonitoringStarted { route_id, .. }
            | Self::MonitoringStopped { route_id, .. }
            | Self::SampleRecorded { route_id, .. }
            | Self::HistoryRefreshed { route_id, .. }
            | Self::SessionClosed { route_id, .. } => *route_id,
        }
    }

    /// Returns the session ID associated with this event.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        match self {
            Self::RouteSelected { session_id, .. }
            | Self::MonitoringStarted { session_id, .. }
            | Self::MonitoringStopped { session_id, .. }
            | Self::SampleRecorded { session_id, .. }
            | Self::HistoryRefreshed { session_id, .. }
            | Self::SessionClosed { session_id, .. } => *session_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RouteSelected { .. } => "route_selected",
            Self::MonitoringStarted { .. } => "monitoring_started",
            Self::MonitoringStopped { .. } => "monitoring_stopped",
            Self::SampleRecorded { .. } => "sample_recorded",
            Self::HistoryRefreshed { .. } => "history_refreshed",
            Self::SessionClosed { .. } => "session_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_refreshed_serializes_with_tag() {
        let event = MonitorEvent::HistoryRefreshed {
            session_id: SessionId::new(),
            route_id: RouteId::new(4),
            sample_count: 3,
            aggregates: Aggregates {
                average_minutes: 25,
                min_minutes: 20,
                max_minutes: 31,
            },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"history_refreshed\""));
        assert!(json.contains("\"average_minutes\":25"));
        assert_eq!(event.event_type_str(), "history_refreshed");
    }

    #[test]
    fn accessors_return_ids() {
        let session_id = SessionId::new();
        let event = MonitorEvent::MonitoringStopped {
            session_id,
            route_id: RouteId::new(9),
            timestamp: Utc::now(),
        };
        assert_eq!(event.route_id(), RouteId::new(9));
        assert_eq!(event.session_id(), session_id);
    }
}

//! The idle/monitoring state machine for one client session.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::schedule::Schedule;
use super::tick::SessionCore;
use super::{MonitorDeps, MonitorState};
use crate::domain::stats::{self, Aggregates, ChartSeries, RecentSample};
use crate::domain::{MonitorEvent, Route, RouteId, SessionId};
use crate::error::WatchError;

/// Read-only view of a session for API responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: SessionId,
    /// Idle or monitoring.
    pub state: MonitorState,
    /// Displayed route, if one is selected.
    pub route: Option<Route>,
    /// Seconds between ticks while monitoring.
    pub period_secs: Option<u64>,
    /// Number of loaded samples.
    pub sample_count: usize,
    /// Aggregates over the loaded samples.
    pub aggregates: Aggregates,
    /// Chart projection of the loaded samples.
    pub chart: ChartSeries,
    /// Newest samples formatted for a list.
    pub recent: Vec<RecentSample>,
    /// When the displayed history was last reloaded.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// One client's monitoring session.
///
/// Owns at most one [`Schedule`]. The schedule is dropped, and so
/// released, whenever the session leaves the monitoring state: on stop,
/// on route switch, on close, and when the session itself is dropped.
#[derive(Debug)]
pub struct MonitorSession {
    core: Arc<SessionCore>,
    schedule: Option<Schedule>,
}

impl MonitorSession {
    /// Creates an idle session with no route selected.
    #[must_use]
    pub fn new(id: SessionId, deps: MonitorDeps) -> Self {
        Self {
            core: Arc::new(SessionCore::new(id, deps)),
            schedule: None,
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.core.id
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> MonitorState {
        if self.schedule.is_some() {
            MonitorState::Monitoring
        } else {
            MonitorState::Idle
        }
    }

    /// Displayed route id, if any.
    pub async fn route_id(&self) -> Option<RouteId> {
        self.core.view.read().await.route_id()
    }

    /// Displays `route_id` and loads its history.
    ///
    /// Any running schedule is released before the new history is loaded,
    /// so the session always ends up idle.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist;
    /// the session is left unchanged in that case.
    pub async fn select_route(&mut self, route_id: RouteId) -> Result<Route, WatchError> {
        let route = self.core.deps.repository.get_route(route_id).await?;
        let _ = self.halt().await;

        let tag = self.core.view.write().await.select(route.clone());
        let sample_count = self.core.load(tag).await.map_or(0, |(count, _)| count);

        let _ = self.core.deps.event_bus.publish(MonitorEvent::RouteSelected {
            session_id: self.core.id,
            route_id,
            sample_count,
            timestamp: Utc::now(),
        });
        tracing::info!(session_id = %self.core.id, %route_id, sample_count, "route selected");
        Ok(route)
    }

    /// Starts ticking for `route_id`, selecting it first if another route
    /// is displayed. Already monitoring that route is a no-op.
    ///
    /// Returns the period between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn start_monitoring(&mut self, route_id: RouteId) -> Result<Duration, WatchError> {
        if self.route_id().await != Some(route_id) {
            let _ = self.select_route(route_id).await?;
        }
        if let Some(schedule) = &self.schedule {
            return Ok(schedule.period());
        }

        let Some(tag) = self.core.view.read().await.tag() else {
            return Err(WatchError::Internal("no route selected".to_string()));
        };
        let period = self.query_period().await;

        let core = Arc::clone(&self.core);
        self.schedule = Some(Schedule::spawn(period, move || {
            let core = Arc::clone(&core);
            async move { core.run_tick(tag).await }
        }));

        let _ = self.core.deps.event_bus.publish(MonitorEvent::MonitoringStarted {
            session_id: self.core.id,
            route_id,
            period_secs: period.as_secs(),
            timestamp: Utc::now(),
        });
        tracing::info!(session_id = %self.core.id, %route_id, period_secs = period.as_secs(), "monitoring started");
        Ok(period)
    }

    /// Stops ticking. Returns `false` if the session was already idle.
    pub async fn stop_monitoring(&mut self) -> bool {
        self.halt().await
    }

    /// Reloads the displayed route's history on demand.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] if no route is selected.
    pub async fn refresh(&self) -> Result<bool, WatchError> {
        let Some(tag) = self.core.view.read().await.tag() else {
            return Err(WatchError::InvalidRequest("no route selected".to_string()));
        };
        Ok(self.core.reload(tag).await)
    }

    /// Replaces the displayed route record after it was edited.
    pub async fn route_updated(&self, route: Route) {
        self.core.view.write().await.replace_route(route);
    }

    /// Releases the schedule and announces the session's end.
    pub async fn close(&mut self) {
        let _ = self.halt().await;
        if let Some(route_id) = self.route_id().await {
            let _ = self.core.deps.event_bus.publish(MonitorEvent::SessionClosed {
                session_id: self.core.id,
                route_id,
                timestamp: Utc::now(),
            });
        }
        tracing::info!(session_id = %self.core.id, "session closed");
    }

    /// Builds a read-only snapshot of the session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let view = self.core.view.read().await;
        let samples = view.samples();
        SessionSnapshot {
            session_id: self.core.id,
            state: self.state(),
            route: view.route().cloned(),
            period_secs: self.schedule.as_ref().map(|s| s.period().as_secs()),
            sample_count: samples.len(),
            aggregates: view.aggregates(),
            chart: stats::chart_series(samples),
            recent: stats::recent_samples(samples),
            refreshed_at: view.refreshed_at(),
        }
    }

    async fn halt(&mut self) -> bool {
        let Some(schedule) = self.schedule.take() else {
            return false;
        };
        schedule.stop();

        if let Some(route_id) = self.route_id().await {
            let _ = self.core.deps.event_bus.publish(MonitorEvent::MonitoringStopped {
                session_id: self.core.id,
                route_id,
                timestamp: Utc::now(),
            });
            tracing::info!(session_id = %self.core.id, %route_id, "monitoring stopped");
        }
        true
    }

    async fn query_period(&self) -> Duration {
        let fallback = self.core.deps.config.default_period;
        match self.core.deps.repository.get_settings().await {
            Ok(settings) => settings.query_period().unwrap_or(fallback),
            Err(err) => {
                tracing::warn!(session_id = %self.core.id, error = %err, "settings unavailable, using default period");
                fallback
            }
        }
    }
}

//! One monitoring tick and the history reload it ends with.
//!
//! A tick runs detached from the session's request handling, so it only
//! touches state through [`SessionCore`]. Every result is checked against
//! the [`TickTag`] the tick was started with before it reaches the view.

use chrono::Utc;
use tokio::sync::RwLock;

use super::MonitorDeps;
use super::view::{RouteView, TickTag};
use crate::domain::sample::clamp_limit;
use crate::domain::stats::Aggregates;
use crate::domain::{MonitorEvent, NewSample, SessionId};
use crate::provider::ProviderError;

/// State shared between a session and its running ticks.
#[derive(Debug)]
pub struct SessionCore {
    /// Owning session.
    pub id: SessionId,
    /// Repository, provider, bus and loop settings.
    pub deps: MonitorDeps,
    /// Displayed route and history.
    pub view: RwLock<RouteView>,
}

impl SessionCore {
    /// Creates a core with nothing selected.
    #[must_use]
    pub fn new(id: SessionId, deps: MonitorDeps) -> Self {
        Self {
            id,
            deps,
            view: RwLock::new(RouteView::default()),
        }
    }

    /// Fetches an estimate, stores it, and reloads history.
    ///
    /// Failures are logged and end the tick early; nothing is stored and
    /// the view is left as it was. The loop keeps running.
    pub async fn run_tick(&self, tag: TickTag) {
        let route = {
            let view = self.view.read().await;
            if view.tag() != Some(tag) {
                tracing::debug!(session_id = %self.id, route_id = %tag.route_id, "skipping tick for replaced selection");
                return;
            }
            match view.route() {
                Some(route) => route.clone(),
                None => return,
            }
        };

        let timeout = self.deps.config.provider_timeout;
        let estimate = match tokio::time::timeout(
            timeout,
            self.deps.provider.estimate(&route.origin, &route.destination),
        )
        .await
        {
            Ok(Ok(estimate)) => estimate,
            Ok(Err(err)) => {
                tracing::warn!(session_id = %self.id, route_id = %route.id, error = %err, "travel-time query failed");
                return;
            }
            Err(_) => {
                let err = ProviderError::Timeout(timeout);
                tracing::warn!(session_id = %self.id, route_id = %route.id, error = %err, "travel-time query failed");
                return;
            }
        };

        let sample = NewSample {
            route_id: route.id,
            duration_seconds: estimate.duration_seconds,
            duration_in_traffic_seconds: estimate.duration_in_traffic_seconds,
            distance_meters: estimate.distance_meters,
            traffic_condition: None,
        };
        let stored = match self.deps.repository.append_sample(&sample).await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(session_id = %self.id, route_id = %route.id, error = %err, "failed to store sample");
                return;
            }
        };

        let _ = self.deps.event_bus.publish(MonitorEvent::SampleRecorded {
            session_id: self.id,
            route_id: route.id,
            sample_id: stored.id,
            duration_seconds: stored.duration_seconds,
            duration_in_traffic_seconds: stored.duration_in_traffic_seconds,
            distance_meters: stored.distance_meters,
            timestamp: stored.query_datetime,
        });
        tracing::debug!(session_id = %self.id, route_id = %route.id, sample_id = stored.id, "sample recorded");

        let _ = self.reload(tag).await;
    }

    /// Reloads the history for `tag` and applies it if the selection has
    /// not changed meanwhile, then announces the new aggregates.
    ///
    /// Returns `true` if the view was updated. On a read failure the
    /// previous history stays displayed.
    pub async fn reload(&self, tag: TickTag) -> bool {
        let Some((sample_count, aggregates)) = self.load(tag).await else {
            return false;
        };
        let _ = self.deps.event_bus.publish(MonitorEvent::HistoryRefreshed {
            session_id: self.id,
            route_id: tag.route_id,
            sample_count,
            aggregates,
            timestamp: Utc::now(),
        });
        true
    }

    /// Same as [`SessionCore::reload`] without the event. Returns the
    /// applied sample count and aggregates.
    pub async fn load(&self, tag: TickTag) -> Option<(usize, Aggregates)> {
        let samples = match self
            .deps
            .repository
            .list_samples(tag.route_id, clamp_limit(Some(self.deps.config.history_limit)))
            .await
        {
            Ok(samples) => samples,
            Err(err) => {
                tracing::warn!(session_id = %self.id, route_id = %tag.route_id, error = %err, "failed to reload history");
                return None;
            }
        };
        let sample_count = samples.len();

        let mut view = self.view.write().await;
        if !view.apply(tag, samples) {
            tracing::debug!(session_id = %self.id, route_id = %tag.route_id, "discarding stale history");
            return None;
        }
        Some((sample_count, view.aggregates()))
    }
}

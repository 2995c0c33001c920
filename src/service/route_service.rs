//! Route service: route catalog, sample history, and settings.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::sample::clamp_limit;
use crate::domain::stats::{self, Aggregates, ChartSeries, RecentSample};
use crate::domain::{
    NewSample, Route, RouteDraft, RouteId, SettingsUpdate, TravelTimeSample, UserSettings,
};
use crate::error::WatchError;
use crate::monitor::SessionRegistry;
use crate::persistence::TravelRepository;

/// Aggregates and chart data computed over a route's recent samples.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RouteAnalysis {
    /// Analysed route.
    pub route_id: RouteId,
    /// Number of samples the figures were computed from.
    pub sample_count: usize,
    /// Mean, min and max duration in minutes.
    pub aggregates: Aggregates,
    /// Chronological chart points.
    pub chart: ChartSeries,
    /// Newest samples formatted for a list.
    pub recent: Vec<RecentSample>,
}

/// Orchestration layer for everything outside the monitoring loop.
///
/// Validates input, delegates storage to the [`TravelRepository`], and
/// keeps open sessions consistent with route edits and deletions.
#[derive(Debug, Clone)]
pub struct RouteService {
    repository: Arc<dyn TravelRepository>,
    sessions: Arc<SessionRegistry>,
}

impl RouteService {
    /// Creates a new `RouteService`.
    #[must_use]
    pub fn new(repository: Arc<dyn TravelRepository>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            repository,
            sessions,
        }
    }

    /// Creates the schema and seeds the settings row. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    pub async fn initialize(&self) -> Result<(), WatchError> {
        self.repository.initialize().await?;
        tracing::info!("database initialized");
        Ok(())
    }

    /// Lists routes, newest first, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    pub async fn list_routes(&self, active_only: bool) -> Result<Vec<Route>, WatchError> {
        self.repository.list_routes(active_only).await
    }

    /// Loads one route.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn get_route(&self, id: RouteId) -> Result<Route, WatchError> {
        self.repository.get_route(id).await
    }

    /// Validates and stores a new active route.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] if a field is blank or too
    /// long.
    pub async fn create_route(&self, draft: &RouteDraft) -> Result<Route, WatchError> {
        draft.validate()?;
        let route = self.repository.create_route(draft).await?;
        tracing::info!(route_id = %route.id, name = %route.name, "route created");
        Ok(route)
    }

    /// Validates and replaces a route's name and locations.
    ///
    /// Sessions displaying the route pick up the new locations on their
    /// next tick.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] or
    /// [`WatchError::RouteNotFound`].
    pub async fn update_route(&self, id: RouteId, draft: &RouteDraft) -> Result<Route, WatchError> {
        draft.validate()?;
        let route = self.repository.update_route(id, draft).await?;
        self.sessions.route_updated(&route).await;
        tracing::info!(route_id = %id, "route updated");
        Ok(route)
    }

    /// Sets a route's active flag.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn toggle_route(&self, id: RouteId, active: bool) -> Result<Route, WatchError> {
        let route = self.repository.set_route_active(id, active).await?;
        self.sessions.route_updated(&route).await;
        tracing::info!(route_id = %id, active, "route toggled");
        Ok(route)
    }

    /// Deletes a route and its samples, and stops every session
    /// monitoring it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn delete_route(&self, id: RouteId) -> Result<(), WatchError> {
        self.repository.delete_route(id).await?;
        let stopped = self.sessions.stop_route(id).await;
        tracing::info!(route_id = %id, stopped, "route deleted");
        Ok(())
    }

    /// Validates and appends a sample.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] for negative measurements or
    /// [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn append_sample(&self, sample: &NewSample) -> Result<TravelTimeSample, WatchError> {
        sample.validate()?;
        self.repository.append_sample(sample).await
    }

    /// Lists a route's samples newest first. `limit` defaults to 100.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn list_samples(
        &self,
        route_id: RouteId,
        limit: Option<u32>,
    ) -> Result<Vec<TravelTimeSample>, WatchError> {
        let _ = self.repository.get_route(route_id).await?;
        self.repository
            .list_samples(route_id, clamp_limit(limit))
            .await
    }

    /// Computes aggregates and chart data over a route's newest samples.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    pub async fn analysis(
        &self,
        route_id: RouteId,
        limit: Option<u32>,
    ) -> Result<RouteAnalysis, WatchError> {
        let samples = self.list_samples(route_id, limit).await?;
        Ok(RouteAnalysis {
            route_id,
            sample_count: samples.len(),
            aggregates: stats::aggregates(&samples),
            chart: stats::chart_series(&samples),
            recent: stats::recent_samples(&samples),
        })
    }

    /// Reads the settings singleton.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    pub async fn get_settings(&self) -> Result<UserSettings, WatchError> {
        self.repository.get_settings().await
    }

    /// Validates and replaces the settings singleton.
    ///
    /// Running sessions keep their period until they are restarted.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] for out-of-range values or
    /// [`WatchError::InvalidIntervals`] for malformed windows.
    pub async fn replace_settings(
        &self,
        update: &SettingsUpdate,
    ) -> Result<UserSettings, WatchError> {
        update.validate()?;
        let settings = self.repository.replace_settings(update).await?;
        tracing::info!(
            query_frequency_minutes = settings.query_frequency_minutes,
            "settings replaced"
        );
        Ok(settings)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::monitor::testing::{ScriptedProvider, deps, seed_samples, settle};
    use crate::monitor::{MonitorSession, MonitorState};
    use crate::persistence::MemoryRepository;

    fn service() -> (Arc<MemoryRepository>, Arc<SessionRegistry>, RouteService) {
        let repository = Arc::new(MemoryRepository::new());
        let sessions = Arc::new(SessionRegistry::new());
        let service = RouteService::new(
            Arc::clone(&repository) as Arc<dyn TravelRepository>,
            Arc::clone(&sessions),
        );
        (repository, sessions, service)
    }

    fn work() -> RouteDraft {
        RouteDraft::new("Work", "Rua Augusta, 500", "Av. Paulista, 1000")
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let (_repository, _sessions, service) = service();
        let draft = RouteDraft::new("Work", "  ", "Av. Paulista");
        assert!(matches!(
            service.create_route(&draft).await,
            Err(WatchError::InvalidRequest(_))
        ));
        assert!(service.list_routes(false).await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn toggle_then_filter_active() {
        let (_repository, _sessions, service) = service();
        let Ok(route) = service.create_route(&work()).await else {
            panic!("create failed");
        };
        let Ok(toggled) = service.toggle_route(route.id, false).await else {
            panic!("toggle failed");
        };
        assert!(!toggled.is_active);
        assert!(service.list_routes(true).await.unwrap_or_default().is_empty());
        assert_eq!(service.list_routes(false).await.unwrap_or_default().len(), 1);
    }

    #[tokio::test]
    async fn samples_of_missing_route_is_not_found() {
        let (_repository, _sessions, service) = service();
        assert!(matches!(
            service.list_samples(RouteId::new(7), None).await,
            Err(WatchError::RouteNotFound(_))
        ));
    }

    #[tokio::test]
    async fn append_rejects_negative_duration() {
        let (_repository, _sessions, service) = service();
        let Ok(route) = service.create_route(&work()).await else {
            panic!("create failed");
        };
        let sample = NewSample {
            route_id: route.id,
            duration_seconds: -1,
            duration_in_traffic_seconds: None,
            distance_meters: 100,
            traffic_condition: None,
        };
        assert!(matches!(
            service.append_sample(&sample).await,
            Err(WatchError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn analysis_over_recent_samples() {
        let (repository, _sessions, service) = service();
        let Ok(route) = service.create_route(&work()).await else {
            panic!("create failed");
        };
        seed_samples(repository.as_ref(), route.id, &[600, 900, 1200, 3000]).await;

        let Ok(all) = service.analysis(route.id, None).await else {
            panic!("analysis failed");
        };
        assert_eq!(all.sample_count, 4);
        assert_eq!(all.aggregates.min_minutes, 10);
        assert_eq!(all.aggregates.max_minutes, 50);
        assert_eq!(all.aggregates.average_minutes, 24);

        let Ok(latest) = service.analysis(route.id, Some(1)).await else {
            panic!("analysis failed");
        };
        assert_eq!(latest.sample_count, 1);
        assert_eq!(latest.aggregates.average_minutes, 50);
        assert!(!latest.chart.show_traffic);
    }

    #[tokio::test]
    async fn replace_settings_validates_ranges() {
        let (_repository, _sessions, service) = service();
        let too_fast = SettingsUpdate {
            preparation_minutes: 10,
            query_frequency_minutes: 0,
            monitoring_intervals: "08:00-09:00".to_string(),
        };
        assert!(service.replace_settings(&too_fast).await.is_err());

        let bad_windows = SettingsUpdate {
            query_frequency_minutes: 10,
            monitoring_intervals: "09:00-08:00".to_string(),
            ..too_fast.clone()
        };
        assert!(matches!(
            service.replace_settings(&bad_windows).await,
            Err(WatchError::InvalidIntervals(_))
        ));

        let valid = SettingsUpdate {
            monitoring_intervals: "07:30-08:30, 17:00-18:00".to_string(),
            ..bad_windows
        };
        let Ok(settings) = service.replace_settings(&valid).await else {
            panic!("replace failed");
        };
        assert_eq!(settings.query_frequency_minutes, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_stops_sessions_monitoring_the_route() {
        let (repository, sessions, service) = service();
        let Ok(route) = service.create_route(&work()).await else {
            panic!("create failed");
        };
        let session = MonitorSession::new(
            crate::domain::SessionId::new(),
            deps(
                Arc::clone(&repository) as Arc<dyn TravelRepository>,
                Arc::new(ScriptedProvider::new()),
            ),
        );
        let Ok(handle) = sessions.insert(session).await else {
            panic!("insert failed");
        };
        let _ = handle.lock().await.start_monitoring(route.id).await;
        settle().await;

        assert!(service.delete_route(route.id).await.is_ok());
        assert_eq!(handle.lock().await.state(), MonitorState::Idle);
        assert!(matches!(
            service.get_route(route.id).await,
            Err(WatchError::RouteNotFound(_))
        ));
    }
}

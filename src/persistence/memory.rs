//! In-process repository used when PostgreSQL persistence is disabled.
//!
//! Mirrors the PostgreSQL semantics: serial ids, server timestamps,
//! newest-first ordering, and cascade delete of samples.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::TravelRepository;
use crate::domain::{
    NewSample, Route, RouteDraft, RouteId, SettingsUpdate, TravelTimeSample, UserSettings,
};
use crate::error::WatchError;

#[derive(Debug, Default)]
struct Tables {
    routes: BTreeMap<RouteId, Route>,
    samples: Vec<TravelTimeSample>,
    settings: Option<UserSettings>,
    last_route_id: i32,
    last_sample_id: i32,
}

/// Repository holding every table in memory behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TravelRepository for MemoryRepository {
    async fn initialize(&self) -> Result<(), WatchError> {
        let mut tables = self.tables.write().await;
        if tables.settings.is_none() {
            tables.settings = Some(UserSettings::default());
        }
        Ok(())
    }

    async fn list_routes(&self, active_only: bool) -> Result<Vec<Route>, WatchError> {
        let tables = self.tables.read().await;
        let mut routes: Vec<Route> = tables
            .routes
            .values()
            .filter(|r| !active_only || r.is_active)
            .cloned()
            .collect();
        routes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(routes)
    }

    async fn get_route(&self, id: RouteId) -> Result<Route, WatchError> {
        self.tables
            .read()
            .await
            .routes
            .get(&id)
            .cloned()
            .ok_or(WatchError::RouteNotFound(id))
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, WatchError> {
        let mut tables = self.tables.write().await;
        tables.last_route_id = tables.last_route_id.saturating_add(1);
        let now = Utc::now();
        let route = Route {
            id: RouteId::new(tables.last_route_id),
            name: draft.name.clone(),
            origin: draft.origin.clone(),
            destination: draft.destination.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.routes.insert(route.id, route.clone());
        Ok(route)
    }

    async fn update_route(&self, id: RouteId, draft: &RouteDraft) -> Result<Route, WatchError> {
        let mut tables = self.tables.write().await;
        let route = tables
            .routes
            .get_mut(&id)
            .ok_or(WatchError::RouteNotFound(id))?;
        route.name.clone_from(&draft.name);
        route.origin.clone_from(&draft.origin);
        route.destination.clone_from(&draft.destination);
        route.updated_at = Utc::now();
        Ok(route.clone())
    }

    async fn set_route_active(&self, id: RouteId, active: bool) -> Result<Route, WatchError> {
        let mut tables = self.tables.write().await;
        let route = tables
            .routes
            .get_mut(&id)
            .ok_or(WatchError::RouteNotFound(id))?;
        route.is_active = active;
        route.updated_at = Utc::now();
        Ok(route.clone())
    }

    async fn delete_route(&self, id: RouteId) -> Result<(), WatchError> {
        let mut tables = self.tables.write().await;
        tables
            .routes
            .remove(&id)
            .ok_or(WatchError::RouteNotFound(id))?;
        tables.samples.retain(|s| s.route_id != id);
        Ok(())
    }

    async fn append_sample(&self, sample: &NewSample) -> Result<TravelTimeSample, WatchError> {
        let mut tables = self.tables.write().await;
        if !tables.routes.contains_key(&sample.route_id) {
            return Err(WatchError::RouteNotFound(sample.route_id));
        }
        tables.last_sample_id = tables.last_sample_id.saturating_add(1);
        let stored = TravelTimeSample {
            id: tables.last_sample_id,
            route_id: sample.route_id,
            query_datetime: Utc::now(),
            duration_seconds: sample.duration_seconds,
            duration_in_traffic_seconds: sample.duration_in_traffic_seconds,
            distance_meters: sample.distance_meters,
            traffic_condition: sample.traffic_condition.clone(),
        };
        tables.samples.push(stored.clone());
        Ok(stored)
    }

    async fn list_samples(
        &self,
        route_id: RouteId,
        limit: u32,
    ) -> Result<Vec<TravelTimeSample>, WatchError> {
        let tables = self.tables.read().await;
        let mut samples: Vec<TravelTimeSample> = tables
            .samples
            .iter()
            .filter(|s| s.route_id == route_id)
            .cloned()
            .collect();
        samples.sort_by(|a, b| {
            b.query_datetime
                .cmp(&a.query_datetime)
                .then(b.id.cmp(&a.id))
        });
        samples.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(samples)
    }

    async fn get_settings(&self) -> Result<UserSettings, WatchError> {
        Ok(self.tables.read().await.settings.clone().unwrap_or_default())
    }

    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<UserSettings, WatchError> {
        let mut tables = self.tables.write().await;
        let settings = tables.settings.get_or_insert_with(UserSettings::default);
        settings.preparation_minutes = update.preparation_minutes;
        settings.query_frequency_minutes = update.query_frequency_minutes;
        settings.monitoring_intervals.clone_from(&update.monitoring_intervals);
        settings.updated_at = Utc::now();
        Ok(settings.clone())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn draft(name: &str) -> RouteDraft {
        RouteDraft::new(name, "Rua Augusta, 500", "Av. Paulista, 1000")
    }

    fn new_sample(route_id: RouteId, duration: i32) -> NewSample {
        NewSample {
            route_id,
            duration_seconds: duration,
            duration_in_traffic_seconds: None,
            distance_meters: 15_000,
            traffic_condition: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_serial_ids() {
        let repo = MemoryRepository::new();
        let Ok(a) = repo.create_route(&draft("a")).await else {
            panic!("create failed");
        };
        let Ok(b) = repo.create_route(&draft("b")).await else {
            panic!("create failed");
        };
        assert_eq!(a.id, RouteId::new(1));
        assert_eq!(b.id, RouteId::new(2));
        assert!(a.is_active);
    }

    #[tokio::test]
    async fn list_filters_inactive_and_orders_newest_first() {
        let repo = MemoryRepository::new();
        let Ok(a) = repo.create_route(&draft("a")).await else {
            panic!("create failed");
        };
        let Ok(b) = repo.create_route(&draft("b")).await else {
            panic!("create failed");
        };
        let _ = repo.set_route_active(a.id, false).await;

        let all = repo.list_routes(false).await.unwrap_or_default();
        let ids: Vec<RouteId> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);

        let active = repo.list_routes(true).await.unwrap_or_default();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().map(|r| r.id), Some(b.id));
    }

    #[tokio::test]
    async fn append_then_list_preserves_fields() {
        let repo = MemoryRepository::new();
        let Ok(route) = repo.create_route(&draft("work")).await else {
            panic!("create failed");
        };
        let _ = repo.append_sample(&new_sample(route.id, 1200)).await;
        let sample = NewSample {
            route_id: route.id,
            duration_seconds: 1800,
            duration_in_traffic_seconds: Some(2100),
            distance_meters: 15_000,
            traffic_condition: None,
        };
        let Ok(stored) = repo.append_sample(&sample).await else {
            panic!("append failed");
        };

        let listed = repo.list_samples(route.id, 100).await.unwrap_or_default();
        let Some(first) = listed.first() else {
            panic!("expected samples");
        };
        assert_eq!(first.id, stored.id);
        assert_eq!(first.duration_seconds, 1800);
        assert_eq!(first.duration_in_traffic_seconds, Some(2100));
        assert_eq!(first.distance_meters, 15_000);
    }

    #[tokio::test]
    async fn list_respects_limit() {
        let repo = MemoryRepository::new();
        let Ok(route) = repo.create_route(&draft("work")).await else {
            panic!("create failed");
        };
        for d in 0..5 {
            let _ = repo.append_sample(&new_sample(route.id, 600 + d)).await;
        }
        let listed = repo.list_samples(route.id, 3).await.unwrap_or_default();
        let durations: Vec<i32> = listed.iter().map(|s| s.duration_seconds).collect();
        assert_eq!(durations, vec![604, 603, 602]);
    }

    #[tokio::test]
    async fn append_to_missing_route_fails() {
        let repo = MemoryRepository::new();
        let result = repo.append_sample(&new_sample(RouteId::new(42), 60)).await;
        assert!(matches!(result, Err(WatchError::RouteNotFound(id)) if id == RouteId::new(42)));
    }

    #[tokio::test]
    async fn delete_cascades_to_samples() {
        let repo = MemoryRepository::new();
        let Ok(route) = repo.create_route(&draft("work")).await else {
            panic!("create failed");
        };
        let _ = repo.append_sample(&new_sample(route.id, 600)).await;

        assert!(repo.delete_route(route.id).await.is_ok());
        assert!(repo.list_samples(route.id, 100).await.unwrap_or_default().is_empty());
        assert!(repo.get_route(route.id).await.is_err());
        assert!(repo.delete_route(route.id).await.is_err());
    }

    #[tokio::test]
    async fn settings_default_then_replace() {
        let repo = MemoryRepository::new();
        let Ok(settings) = repo.get_settings().await else {
            panic!("settings read failed");
        };
        assert_eq!(settings.query_frequency_minutes, 5);

        let update = SettingsUpdate {
            preparation_minutes: 20,
            query_frequency_minutes: 10,
            monitoring_intervals: "07:00-08:00".to_string(),
        };
        let _ = repo.replace_settings(&update).await;
        let Ok(settings) = repo.get_settings().await else {
            panic!("settings read failed");
        };
        assert_eq!(settings.preparation_minutes, 20);
        assert_eq!(settings.query_frequency_minutes, 10);
        assert_eq!(settings.monitoring_intervals, "07:00-08:00");
    }
}

//! Scripted collaborators for monitoring tests.

#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::MonitorDeps;
use crate::config::MonitorConfig;
use crate::domain::{
    EventBus, NewSample, Route, RouteDraft, RouteId, SettingsUpdate, TravelTimeSample,
    UserSettings,
};
use crate::error::WatchError;
use crate::persistence::{MemoryRepository, TravelRepository};
use crate::provider::{DistanceEstimate, DistanceProvider, ProviderError};

/// Estimate returned once the script runs out.
pub const FALLBACK_ESTIMATE: DistanceEstimate = DistanceEstimate {
    duration_seconds: 1800,
    duration_in_traffic_seconds: Some(2100),
    distance_meters: 15_000,
};

/// Provider that replays queued results, then [`FALLBACK_ESTIMATE`].
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<DistanceEstimate, ProviderError>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps for `delay` before answering.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn push(&self, result: Result<DistanceEstimate, ProviderError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(result);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for ScriptedProvider {
    async fn estimate(
        &self,
        _origin: &str,
        _destination: &str,
    ) -> Result<DistanceEstimate, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or(Ok(FALLBACK_ESTIMATE))
    }
}

/// In-memory repository whose reads and writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyRepository {
    inner: MemoryRepository,
    pub fail_appends: AtomicBool,
    pub fail_lists: AtomicBool,
    pub fail_settings: AtomicBool,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(flag: &AtomicBool) -> Result<(), WatchError> {
        if flag.load(Ordering::SeqCst) {
            return Err(WatchError::PersistenceError("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TravelRepository for FlakyRepository {
    async fn initialize(&self) -> Result<(), WatchError> {
        self.inner.initialize().await
    }

    async fn list_routes(&self, active_only: bool) -> Result<Vec<Route>, WatchError> {
        self.inner.list_routes(active_only).await
    }

    async fn get_route(&self, id: RouteId) -> Result<Route, WatchError> {
        self.inner.get_route(id).await
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, WatchError> {
        self.inner.create_route(draft).await
    }

    async fn update_route(&self, id: RouteId, draft: &RouteDraft) -> Result<Route, WatchError> {
        self.inner.update_route(id, draft).await
    }

    async fn set_route_active(&self, id: RouteId, active: bool) -> Result<Route, WatchError> {
        self.inner.set_route_active(id, active).await
    }

    async fn delete_route(&self, id: RouteId) -> Result<(), WatchError> {
        self.inner.delete_route(id).await
    }

    async fn append_sample(&self, sample: &NewSample) -> Result<TravelTimeSample, WatchError> {
        Self::check(&self.fail_appends)?;
        self.inner.append_sample(sample).await
    }

    async fn list_samples(
        &self,
        route_id: RouteId,
        limit: u32,
    ) -> Result<Vec<TravelTimeSample>, WatchError> {
        Self::check(&self.fail_lists)?;
        self.inner.list_samples(route_id, limit).await
    }

    async fn get_settings(&self) -> Result<UserSettings, WatchError> {
        Self::check(&self.fail_settings)?;
        self.inner.get_settings().await
    }

    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<UserSettings, WatchError> {
        self.inner.replace_settings(update).await
    }
}

pub fn deps(
    repository: Arc<dyn TravelRepository>,
    provider: Arc<dyn DistanceProvider>,
) -> MonitorDeps {
    MonitorDeps::new(repository, provider, EventBus::new(64), MonitorConfig::default())
}

pub async fn seed_route(repository: &dyn TravelRepository, name: &str) -> Route {
    let draft = RouteDraft::new(name, format!("{name} origin"), format!("{name} destination"));
    let Ok(route) = repository.create_route(&draft).await else {
        panic!("failed to seed route {name}");
    };
    route
}

pub async fn seed_samples(repository: &dyn TravelRepository, route_id: RouteId, durations: &[i32]) {
    for duration in durations {
        let sample = NewSample {
            route_id,
            duration_seconds: *duration,
            duration_in_traffic_seconds: None,
            distance_meters: 10_000,
            traffic_condition: None,
        };
        let Ok(_) = repository.append_sample(&sample).await else {
            panic!("failed to seed sample");
        };
    }
}

pub async fn stored_count(repository: &dyn TravelRepository, route_id: RouteId) -> usize {
    repository
        .list_samples(route_id, 1000)
        .await
        .map(|s| s.len())
        .unwrap_or_default()
}

/// Lets spawned tasks run without reaching the next scheduled tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

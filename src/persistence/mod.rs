//! Persistence layer: routes, travel-time samples, and settings.
//!
//! Provides the [`TravelRepository`] trait for durable storage. The
//! production implementation uses `sqlx::PgPool`; [`MemoryRepository`]
//! backs the service when persistence is disabled and in tests.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{
    NewSample, Route, RouteDraft, RouteId, SettingsUpdate, TravelTimeSample, UserSettings,
};
use crate::error::WatchError;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Table-mirroring storage operations.
///
/// Every method is a single request/response; none exposes partial
/// failure. Missing routes surface as [`WatchError::RouteNotFound`].
#[async_trait]
pub trait TravelRepository: Send + Sync + std::fmt::Debug {
    /// Creates the tables and seeds the settings row. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    async fn initialize(&self) -> Result<(), WatchError>;

    /// Lists routes, newest created first.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    async fn list_routes(&self, active_only: bool) -> Result<Vec<Route>, WatchError>;

    /// Loads one route.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    async fn get_route(&self, id: RouteId) -> Result<Route, WatchError>;

    /// Inserts an active route.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, WatchError>;

    /// Replaces name, origin and destination.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    async fn update_route(&self, id: RouteId, draft: &RouteDraft) -> Result<Route, WatchError>;

    /// Sets the active flag.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    async fn set_route_active(&self, id: RouteId, active: bool) -> Result<Route, WatchError>;

    /// Deletes a route and, by cascade, all of its samples.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    async fn delete_route(&self, id: RouteId) -> Result<(), WatchError>;

    /// Appends a sample timestamped at insertion.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::RouteNotFound`] if the route does not exist.
    async fn append_sample(&self, sample: &NewSample) -> Result<TravelTimeSample, WatchError>;

    /// Lists a route's samples newest first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    async fn list_samples(
        &self,
        route_id: RouteId,
        limit: u32,
    ) -> Result<Vec<TravelTimeSample>, WatchError>;

    /// Reads the settings singleton, or defaults if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    async fn get_settings(&self) -> Result<UserSettings, WatchError>;

    /// Replaces the settings singleton.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PersistenceError`] on database failure.
    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<UserSettings, WatchError>;
}

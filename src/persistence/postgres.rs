//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::TravelRepository;
use super::models::{
    RouteRow, SampleRow, SettingsRow, route_from_row, sample_from_row, settings_from_row,
};
use crate::config::WatchConfig;
use crate::domain::{
    NewSample, Route, RouteDraft, RouteId, SettingsUpdate, TravelTimeSample, UserSettings,
};
use crate::error::WatchError;

/// PostgreSQL-backed repository using `sqlx::PgPool`.
///
/// Every operation is one parameterized statement.
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`WatchError::PersistenceError`] if the database cannot be
    /// reached.
    pub async fn connect(config: &WatchConfig) -> Result<Self, WatchError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }
}

/// Maps a foreign-key violation on `travel_times.route_id` to
/// [`WatchError::RouteNotFound`].
fn map_sample_insert_error(err: sqlx::Error, route_id: RouteId) -> WatchError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            WatchError::RouteNotFound(route_id)
        }
        _ => WatchError::from(err),
    }
}

#[async_trait]
impl TravelRepository for PostgresRepository {
    async fn initialize(&self) -> Result<(), WatchError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn list_routes(&self, active_only: bool) -> Result<Vec<Route>, WatchError> {
        let rows = if active_only {
            sqlx::query_as::<_, RouteRow>(
                "SELECT id, name, origin, destination, is_active, created_at, updated_at \
                 FROM routes WHERE is_active ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, RouteRow>(
                "SELECT id, name, origin, destination, is_active, created_at, updated_at \
                 FROM routes ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&self.pool)
            .await
        }?;

        Ok(rows.into_iter().map(route_from_row).collect())
    }

    async fn get_route(&self, id: RouteId) -> Result<Route, WatchError> {
        sqlx::query_as::<_, RouteRow>(
            "SELECT id, name, origin, destination, is_active, created_at, updated_at \
             FROM routes WHERE id = $1",
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(route_from_row)
        .ok_or(WatchError::RouteNotFound(id))
    }

    async fn create_route(&self, draft: &RouteDraft) -> Result<Route, WatchError> {
        let row = sqlx::query_as::<_, RouteRow>(
            "INSERT INTO routes (name, origin, destination, is_active) VALUES ($1, $2, $3, true) \
             RETURNING id, name, origin, destination, is_active, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(&draft.origin)
        .bind(&draft.destination)
        .fetch_one(&self.pool)
        .await?;

        Ok(route_from_row(row))
    }

    async fn update_route(&self, id: RouteId, draft: &RouteDraft) -> Result<Route, WatchError> {
        sqlx::query_as::<_, RouteRow>(
            "UPDATE routes SET name = $1, origin = $2, destination = $3, updated_at = now() \
             WHERE id = $4 \
             RETURNING id, name, origin, destination, is_active, created_at, updated_at",
        )
        .bind(&draft.name)
        .bind(&draft.origin)
        .bind(&draft.destination)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(route_from_row)
        .ok_or(WatchError::RouteNotFound(id))
    }

    async fn set_route_active(&self, id: RouteId, active: bool) -> Result<Route, WatchError> {
        sqlx::query_as::<_, RouteRow>(
            "UPDATE routes SET is_active = $1, updated_at = now() WHERE id = $2 \
             RETURNING id, name, origin, destination, is_active, created_at, updated_at",
        )
        .bind(active)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .map(route_from_row)
        .ok_or(WatchError::RouteNotFound(id))
    }

    async fn delete_route(&self, id: RouteId) -> Result<(), WatchError> {
        let result = sqlx::query("DELETE FROM routes WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(WatchError::RouteNotFound(id));
        }
        Ok(())
    }

    async fn append_sample(&self, sample: &NewSample) -> Result<TravelTimeSample, WatchError> {
        let row = sqlx::query_as::<_, SampleRow>(
            "INSERT INTO travel_times \
             (route_id, duration_seconds, duration_in_traffic_seconds, distance_meters, traffic_condition) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, route_id, query_datetime, duration_seconds, \
             duration_in_traffic_seconds, distance_meters, traffic_condition",
        )
        .bind(sample.route_id.get())
        .bind(sample.duration_seconds)
        .bind(sample.duration_in_traffic_seconds)
        .bind(sample.distance_meters)
        .bind(sample.traffic_condition.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sample_insert_error(e, sample.route_id))?;

        Ok(sample_from_row(row))
    }

    async fn list_samples(
        &self,
        route_id: RouteId,
        limit: u32,
    ) -> Result<Vec<TravelTimeSample>, WatchError> {
        let rows = sqlx::query_as::<_, SampleRow>(
            "SELECT id, route_id, query_datetime, duration_seconds, \
             duration_in_traffic_seconds, distance_meters, traffic_condition \
             FROM travel_times WHERE route_id = $1 \
             ORDER BY query_datetime DESC, id DESC LIMIT $2",
        )
        .bind(route_id.get())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(sample_from_row).collect())
    }

    async fn get_settings(&self) -> Result<UserSettings, WatchError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT preparation_minutes, query_frequency_minutes, monitoring_intervals, \
             created_at, updated_at FROM user_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(settings_from_row).unwrap_or_default())
    }

    async fn replace_settings(&self, update: &SettingsUpdate) -> Result<UserSettings, WatchError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "INSERT INTO user_settings \
             (id, preparation_minutes, query_frequency_minutes, monitoring_intervals) \
             VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET \
             preparation_minutes = EXCLUDED.preparation_minutes, \
             query_frequency_minutes = EXCLUDED.query_frequency_minutes, \
             monitoring_intervals = EXCLUDED.monitoring_intervals, \
             updated_at = now() \
             RETURNING preparation_minutes, query_frequency_minutes, monitoring_intervals, \
             created_at, updated_at",
        )
        .bind(update.preparation_minutes)
        .bind(update.query_frequency_minutes)
        .bind(&update.monitoring_intervals)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings_from_row(row))
    }
}

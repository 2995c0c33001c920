//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Unset or unparsable values fall back
//! to defaults, except for `LISTEN_ADDR`.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

use crate::domain::sample::clamp_limit;

/// Default Google Distance Matrix JSON endpoint.
pub const DEFAULT_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Top-level service configuration.
///
/// Loaded once at startup via [`WatchConfig::from_env`].
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3001`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Master switch for the PostgreSQL repository. When off, routes and
    /// samples live in memory for the lifetime of the process.
    pub persistence_enabled: bool,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Distance provider connection settings.
    pub provider: ProviderConfig,

    /// Monitoring loop settings.
    pub monitor: MonitorConfig,
}

/// Distance provider connection settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Distance Matrix endpoint URL.
    pub url: String,
    /// API key appended as the `key` query parameter.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Monitoring loop settings shared by every session.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Period used when the stored query frequency cannot be read.
    pub default_period: Duration,
    /// Upper bound on a single provider call inside a tick.
    pub provider_timeout: Duration,
    /// Number of samples loaded on every history reload.
    pub history_limit: u32,
    /// Sessions untouched for this long are closed. `None` keeps them
    /// until they are closed explicitly.
    pub session_idle_timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_period: Duration::from_secs(5 * 60),
            provider_timeout: Duration::from_secs(10),
            history_limit: 100,
            session_idle_timeout: Some(Duration::from_secs(30 * 60)),
        }
    }
}

impl WatchConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let raw_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
        let listen_addr: SocketAddr = raw_addr
            .parse()
            .with_context(|| format!("invalid LISTEN_ADDR: {raw_addr}"))?;

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            compose_database_url(
                &env_or("DATABASE_HOST", "localhost"),
                parse_env("DATABASE_PORT", 5432u16),
                &env_or("DATABASE_NAME", "postgres"),
                &env_or("DATABASE_USER", "postgres"),
                &env_or("DATABASE_PASSWORD", "postgres"),
            )
        });

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 10);
        let database_min_connections = parse_env("DATABASE_MIN_CONNECTIONS", 2);
        let database_connect_timeout_secs = parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5);

        let persistence_enabled = parse_env_bool("PERSISTENCE_ENABLED", true);
        let event_bus_capacity = parse_env("EVENT_BUS_CAPACITY", 1024);

        let api_key = std::env::var("GOOGLE_MAPS_API_KEY")
            .unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("GOOGLE_MAPS_API_KEY is not set; provider calls will be rejected");
        }

        let provider_timeout = Duration::from_secs(parse_env("PROVIDER_TIMEOUT_SECS", 10));
        let provider = ProviderConfig {
            url: env_or("DISTANCE_MATRIX_URL", DEFAULT_DISTANCE_MATRIX_URL),
            api_key,
            timeout: provider_timeout,
        };

        let monitor = MonitorConfig {
            default_period: Duration::from_secs(
                parse_env::<u64>("DEFAULT_QUERY_FREQUENCY_MINUTES", 5).max(1) * 60,
            ),
            provider_timeout,
            history_limit: clamp_limit(Some(parse_env("HISTORY_LIMIT", 100))),
            session_idle_timeout: idle_timeout(parse_env("SESSION_IDLE_TIMEOUT_SECS", 30 * 60)),
        };

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections,
            database_min_connections,
            database_connect_timeout_secs,
            persistence_enabled,
            event_bus_capacity,
            provider,
            monitor,
        })
    }
}

/// `0` disables idle expiry.
fn idle_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Builds a `postgres://` URL from its individual parts.
#[must_use]
pub fn compose_database_url(host: &str, port: u16, name: &str, user: &str, password: &str) -> String {
    format!("postgres://{user}:{password}@{host}:{port}/{name}")
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    parse_bool(std::env::var(key).ok().as_deref(), default)
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

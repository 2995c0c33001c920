//! travel-watch server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use travel_watch::api;
use travel_watch::app_state::AppState;
use travel_watch::config::WatchConfig;
use travel_watch::domain::EventBus;
use travel_watch::monitor::{MonitorDeps, SessionRegistry};
use travel_watch::persistence::{MemoryRepository, PostgresRepository, TravelRepository};
use travel_watch::provider::{DistanceProvider, GoogleDistanceMatrix};
use travel_watch::service::{MonitorService, RouteService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = WatchConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting travel-watch");

    // Persistence
    let repository: Arc<dyn TravelRepository> = if config.persistence_enabled {
        let postgres = PostgresRepository::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        postgres
            .initialize()
            .await
            .context("failed to run database migrations")?;
        tracing::info!("PostgreSQL persistence enabled");
        Arc::new(postgres)
    } else {
        let memory = MemoryRepository::new();
        memory.initialize().await?;
        tracing::warn!("persistence disabled; data lives in memory only");
        Arc::new(memory)
    };

    // Distance provider
    let provider: Arc<dyn DistanceProvider> = Arc::new(
        GoogleDistanceMatrix::new(&config.provider).context("invalid distance provider config")?,
    );

    // Service layer
    let event_bus = EventBus::new(config.event_bus_capacity);
    let sessions = Arc::new(SessionRegistry::new());
    let deps = MonitorDeps::new(
        Arc::clone(&repository),
        provider,
        event_bus.clone(),
        config.monitor,
    );
    let route_service = Arc::new(RouteService::new(repository, Arc::clone(&sessions)));
    let monitor_service = Arc::new(MonitorService::new(deps, sessions));
    let reaper = monitor_service.spawn_reaper();

    let app_state = AppState {
        route_service,
        monitor_service: Arc::clone(&monitor_service),
        event_bus,
    };
    let app = api::build_app(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(reaper);
    let _ = monitor_service.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

/// Installs the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                let _ = sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}

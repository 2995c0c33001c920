//! Shared harness: the full application on an ephemeral port, backed by
//! the in-memory repository and a fixed-answer distance provider.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use travel_watch::api;
use travel_watch::app_state::AppState;
use travel_watch::config::MonitorConfig;
use travel_watch::domain::EventBus;
use travel_watch::monitor::{MonitorDeps, SessionRegistry};
use travel_watch::persistence::{MemoryRepository, TravelRepository};
use travel_watch::provider::{DistanceEstimate, DistanceProvider, ProviderError};
use travel_watch::service::{MonitorService, RouteService};

/// Provider answering every query with the same estimate.
#[derive(Debug, Default)]
pub struct FixedProvider {
    calls: AtomicUsize,
}

impl FixedProvider {
    /// Number of estimates served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for FixedProvider {
    async fn estimate(
        &self,
        _origin: &str,
        _destination: &str,
    ) -> Result<DistanceEstimate, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DistanceEstimate {
            duration_seconds: 1800,
            duration_in_traffic_seconds: Some(2100),
            distance_meters: 15_000,
        })
    }
}

/// A running server plus an HTTP client pointed at it.
#[derive(Debug)]
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub provider: Arc<FixedProvider>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Sends a request and decodes the JSON body, returning the status too.
    pub async fn call(&self, request: reqwest::RequestBuilder) -> (u16, Value) {
        let Ok(response) = request.send().await else {
            panic!("request failed");
        };
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        self.call(self.client.get(self.url(path))).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        self.call(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> (u16, Value) {
        self.call(self.client.put(self.url(path)).json(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> (u16, Value) {
        self.call(self.client.patch(self.url(path)).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        self.call(self.client.delete(self.url(path))).await
    }

    /// Creates a route and returns its id.
    pub async fn create_route(&self, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/api/routes",
                &serde_json::json!({
                    "name": name,
                    "origin": format!("{name} origin"),
                    "destination": format!("{name} destination"),
                }),
            )
            .await;
        assert_eq!(status, 201, "create route failed: {body}");
        let Some(id) = body.get("id").and_then(Value::as_i64) else {
            panic!("route id missing: {body}");
        };
        id
    }

    /// Opens a session and returns its id.
    pub async fn open_session(&self) -> String {
        let (status, body) = self.post("/api/sessions", &Value::Null).await;
        assert_eq!(status, 201, "open session failed: {body}");
        let Some(id) = body.get("session_id").and_then(Value::as_str) else {
            panic!("session id missing: {body}");
        };
        id.to_string()
    }
}

/// Starts the application on `127.0.0.1:0`.
pub async fn spawn_app() -> TestApp {
    let repository: Arc<dyn TravelRepository> = Arc::new(MemoryRepository::new());
    let Ok(()) = repository.initialize().await else {
        panic!("memory repository init failed");
    };
    let provider = Arc::new(FixedProvider::default());
    let event_bus = EventBus::new(256);
    let sessions = Arc::new(SessionRegistry::new());

    let deps = MonitorDeps::new(
        Arc::clone(&repository),
        Arc::clone(&provider) as Arc<dyn DistanceProvider>,
        event_bus.clone(),
        MonitorConfig::default(),
    );
    let state = AppState {
        route_service: Arc::new(RouteService::new(repository, Arc::clone(&sessions))),
        monitor_service: Arc::new(MonitorService::new(deps, sessions)),
        event_bus,
    };
    let app = api::build_app(state);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestApp {
        addr,
        client: reqwest::Client::new(),
        provider,
    }
}

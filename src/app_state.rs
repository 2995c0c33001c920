//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::{MonitorService, RouteService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Routes, samples and settings.
    pub route_service: Arc<RouteService>,
    /// Monitoring sessions.
    pub monitor_service: Arc<MonitorService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

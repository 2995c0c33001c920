//! Domain layer: identifiers, records, statistics, and the event system.
//!
//! This module contains the service's data model (routes, travel-time
//! samples, the settings singleton), the pure aggregation functions used
//! to summarise a route's history, and the event bus that carries
//! monitoring events to WebSocket clients.

pub mod event_bus;
pub mod monitor_event;
pub mod route;
pub mod route_id;
pub mod sample;
pub mod session_id;
pub mod settings;
pub mod stats;

pub use event_bus::EventBus;
pub use monitor_event::MonitorEvent;
pub use route::{Route, RouteDraft};
pub use route_id::RouteId;
pub use sample::{NewSample, TravelTimeSample};
pub use session_id::SessionId;
pub use settings::{MonitoringWindow, SettingsUpdate, UserSettings};
pub use stats::{Aggregates, ChartPoint, ChartSeries, RecentSample};

//! # travel-watch
//!
//! REST API and WebSocket service that samples travel times for saved
//! routes and charts them.
//!
//! A client opens a monitoring session, selects a route, and starts
//! monitoring. The session then asks the distance provider for a
//! departure-now estimate immediately and once per configured query
//! frequency, stores each estimate as a sample, and reloads the route's
//! history to recompute average, minimum and maximum durations.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── RouteService, MonitorService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── MonitorSession + Schedule (monitor/)
//!     ├── DistanceProvider (provider/)
//!     │
//!     └── TravelRepository (persistence/): PostgreSQL or in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod persistence;
pub mod provider;
pub mod service;
pub mod ws;

//! Service layer: business logic orchestration.
//!
//! [`RouteService`] validates and stores routes, samples and settings.
//! [`MonitorService`] opens monitoring sessions and drives their state
//! machines. Both share one [`crate::monitor::SessionRegistry`], so route
//! edits and deletions reach the sessions displaying them.

pub mod monitor_service;
pub mod route_service;

pub use monitor_service::MonitorService;
pub use route_service::{RouteAnalysis, RouteService};

//! Per-session monitoring loop.
//!
//! A [`MonitorSession`] displays at most one route and is either idle or
//! monitoring it. While monitoring, a [`Schedule`] fires a tick
//! immediately and then once per query period. Each tick asks the
//! [`DistanceProvider`] for an estimate, stores it, and reloads the
//! route's history.
//!
//! Sessions live in a [`SessionRegistry`], keyed by [`SessionId`].
//!
//! [`SessionId`]: crate::domain::SessionId

pub mod registry;
pub mod schedule;
pub mod session;
pub mod tick;
pub mod view;

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::MonitorConfig;
use crate::domain::EventBus;
use crate::persistence::TravelRepository;
use crate::provider::DistanceProvider;

pub use registry::SessionRegistry;
pub use schedule::Schedule;
pub use session::{MonitorSession, SessionSnapshot};
pub use view::{RouteView, TickTag};

/// Whether a session is currently ticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// No schedule is running.
    Idle,
    /// A schedule is running for the displayed route.
    Monitoring,
}

/// Collaborators shared by every session.
#[derive(Debug, Clone)]
pub struct MonitorDeps {
    /// Storage for routes, samples and settings.
    pub repository: Arc<dyn TravelRepository>,
    /// Travel-time estimate source.
    pub provider: Arc<dyn DistanceProvider>,
    /// Bus that session events are published to.
    pub event_bus: EventBus,
    /// Loop settings.
    pub config: MonitorConfig,
}

impl MonitorDeps {
    /// Bundles the collaborators.
    #[must_use]
    pub fn new(
        repository: Arc<dyn TravelRepository>,
        provider: Arc<dyn DistanceProvider>,
        event_bus: EventBus,
        config: MonitorConfig,
    ) -> Self {
        Self {
            repository,
            provider,
            event_bus,
            config,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;

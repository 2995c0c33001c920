//! The route a session displays, plus its loaded history.

use chrono::{DateTime, Utc};

use crate::domain::stats::{self, Aggregates};
use crate::domain::{Route, RouteId, TravelTimeSample};

/// Identifies which selection a tick or reload was started for.
///
/// `generation` is bumped on every route selection, so a result carrying
/// an older tag is stale even when the route id matches again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTag {
    /// Route the work was started for.
    pub route_id: RouteId,
    /// Selection counter at the time the work was started.
    pub generation: u64,
}

/// What a session currently shows.
#[derive(Debug, Default)]
pub struct RouteView {
    route: Option<Route>,
    generation: u64,
    samples: Vec<TravelTimeSample>,
    aggregates: Aggregates,
    refreshed_at: Option<DateTime<Utc>>,
}

impl RouteView {
    /// Switches to `route`, clearing the previous history.
    ///
    /// Returns the tag that results for the new selection must carry.
    pub fn select(&mut self, route: Route) -> TickTag {
        self.generation = self.generation.wrapping_add(1);
        let route_id = route.id;
        self.route = Some(route);
        self.samples.clear();
        self.aggregates = Aggregates::default();
        self.refreshed_at = None;
        TickTag {
            route_id,
            generation: self.generation,
        }
    }

    /// Replaces the displayed route record when it was edited elsewhere.
    /// Ignored if `route` is not the displayed one.
    pub fn replace_route(&mut self, route: Route) {
        if self.route_id() == Some(route.id) {
            self.route = Some(route);
        }
    }

    /// Tag of the current selection, or `None` before any selection.
    #[must_use]
    pub fn tag(&self) -> Option<TickTag> {
        self.route.as_ref().map(|r| TickTag {
            route_id: r.id,
            generation: self.generation,
        })
    }

    /// Applies a reloaded history if `tag` still names the current
    /// selection. Returns `false` and leaves the view untouched otherwise.
    pub fn apply(&mut self, tag: TickTag, samples: Vec<TravelTimeSample>) -> bool {
        if self.tag() != Some(tag) {
            return false;
        }
        self.aggregates = stats::aggregates(&samples);
        self.samples = samples;
        self.refreshed_at = Some(Utc::now());
        true
    }

    /// Displayed route.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Displayed route id.
    #[must_use]
    pub fn route_id(&self) -> Option<RouteId> {
        self.route.as_ref().map(|r| r.id)
    }

    /// Loaded samples, newest first.
    #[must_use]
    pub fn samples(&self) -> &[TravelTimeSample] {
        &self.samples
    }

    /// Aggregates over [`RouteView::samples`].
    #[must_use]
    pub fn aggregates(&self) -> Aggregates {
        self.aggregates
    }

    /// When the last reload was applied.
    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

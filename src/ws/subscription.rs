//! Per-connection subscription manager.
//!
//! Tracks which routes a WebSocket client follows and filters bus
//! events on the server side.

use std::collections::BTreeSet;

use crate::domain::RouteId;

/// Set of route subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed route ids. Ignored while `subscribe_all` is set.
    route_ids: BTreeSet<RouteId>,
    /// Whether the client follows every route (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds route ids to the subscription set. `wildcard` follows all.
    pub fn subscribe(&mut self, ids: &[RouteId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.route_ids.extend(ids.iter().copied());
    }

    /// Removes route ids. `wildcard` also clears the follow-all flag.
    pub fn unsubscribe(&mut self, ids: &[RouteId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.route_ids.remove(id);
        }
    }

    /// Returns `true` if events for `route_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, route_id: RouteId) -> bool {
        self.subscribe_all || self.route_ids.contains(&route_id)
    }

    /// Explicitly subscribed route ids, ascending.
    #[must_use]
    pub fn route_ids(&self) -> Vec<RouteId> {
        self.route_ids.iter().copied().collect()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

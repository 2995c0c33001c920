//! Type-safe route identifier.
//!
//! [`RouteId`] is a newtype wrapper around the `SERIAL` primary key of the
//! `routes` table so route identifiers cannot be confused with sample ids
//! or other integers.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Server-assigned identifier of a saved route.
///
/// Assigned by the repository on creation and immutable thereafter. Used
/// as the foreign key of every travel-time sample, the tag of in-flight
/// monitoring ticks, and the WebSocket subscription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct RouteId(i32);

impl RouteId {
    /// Wraps a raw database id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the raw database id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for RouteId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

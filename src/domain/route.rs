//! Saved routes: named origin/destination pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RouteId;
use crate::error::WatchError;

/// Maximum length of a route display name.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of an origin or destination.
pub const MAX_LOCATION_LEN: usize = 500;

/// A saved route as stored in the `routes` table.
///
/// `origin` and `destination` are free text handed to the distance
/// provider unchanged. `is_active` only affects list filtering; it does
/// not gate monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Route {
    /// Server-assigned identifier.
    pub id: RouteId,
    /// Display label.
    pub name: String,
    /// Free-text start location.
    pub origin: String,
    /// Free-text end location.
    pub destination: String,
    /// Whether the route shows up in the active list.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit or toggle timestamp.
    pub updated_at: DateTime<Utc>,
}

/// User-editable route fields, used for both create and update.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct RouteDraft {
    /// Display label.
    pub name: String,
    /// Free-text start location.
    pub origin: String,
    /// Free-text end location.
    pub destination: String,
}

impl RouteDraft {
    /// Builds a draft from its three fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// Checks that every field is non-blank and within the column limits.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidRequest`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), WatchError> {
        check_text("name", &self.name, MAX_NAME_LEN)?;
        check_text("origin", &self.origin, MAX_LOCATION_LEN)?;
        check_text("destination", &self.destination, MAX_LOCATION_LEN)
    }
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), WatchError> {
    if value.trim().is_empty() {
        return Err(WatchError::InvalidRequest(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(WatchError::InvalidRequest(format!(
            "{field} exceeds {max} characters"
        )));
    }
    Ok(())
}

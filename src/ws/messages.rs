//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::RouteId;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server message stamped with the current time.
    #[must_use]
    pub fn new(id: impl Into<String>, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message with a numeric code.
    #[must_use]
    pub fn error(id: impl Into<String>, code: u16, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// A route reference in a subscription list: a numeric id, a numeric
/// string, or the `"*"` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RouteSelector {
    /// Route id as a JSON number.
    Id(i32),
    /// Route id as a string, or `"*"`.
    Text(String),
}

impl RouteSelector {
    /// Returns `true` for `"*"`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim() == "*")
    }

    /// Resolves to a route id. `None` for the wildcard and for
    /// non-numeric strings.
    #[must_use]
    pub fn route_id(&self) -> Option<RouteId> {
        match self {
            Self::Id(id) => Some(RouteId::new(*id)),
            Self::Text(s) => s.trim().parse().ok().map(RouteId::new),
        }
    }
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope's `payload`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific routes.
    Subscribe {
        /// Route ids to subscribe to. Use `["*"]` for all routes.
        route_ids: Vec<RouteSelector>,
    },
    /// Unsubscribe from events for specific routes.
    Unsubscribe {
        /// Route ids to unsubscribe from.
        route_ids: Vec<RouteSelector>,
    },
    /// Get a monitoring session snapshot.
    GetSession {
        /// Session UUID.
        session_id: uuid::Uuid,
    },
}

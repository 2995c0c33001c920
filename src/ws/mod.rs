//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams monitoring events for the
//! routes a client subscribes to, and answers session snapshot requests.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;

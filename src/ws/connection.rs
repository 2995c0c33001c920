//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{RouteSelector, WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{MonitorEvent, RouteId, SessionId};
use crate::service::MonitorService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards events for subscribed routes from the
///   [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<MonitorEvent>,
    monitor_service: Arc<MonitorService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &monitor_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(monitor_event) => {
                        if !subs.matches(monitor_event.route_id()) {
                            continue;
                        }
                        let Some(json) = event_message(&monitor_event) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps a bus event in the envelope.
fn event_message(event: &MonitorEvent) -> Option<String> {
    let payload = serde_json::to_value(event).ok()?;
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    monitor_service: &MonitorService,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error("", 400, "malformed JSON")).ok();
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let response = match command {
        WsCommand::Subscribe { route_ids } => {
            let (ids, wildcard) = resolve(&route_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids,
                    "route_ids": subs.route_ids(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { route_ids } => {
            let (ids, wildcard) = resolve(&route_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids,
                    "route_ids": subs.route_ids(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetSession { session_id } => {
            match monitor_service
                .snapshot(SessionId::from_uuid(session_id))
                .await
            {
                Ok(snapshot) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(&snapshot).unwrap_or_default(),
                ),
                Err(err) => {
                    WsMessage::error(msg.id, err.status_code().as_u16(), &err.to_string())
                }
            }
        }
    };
    serde_json::to_string(&response).ok()
}

/// Splits selectors into concrete ids and the wildcard flag. Unparsable
/// entries are ignored.
fn resolve(selectors: &[RouteSelector]) -> (Vec<RouteId>, bool) {
    let wildcard = selectors.iter().any(RouteSelector::is_wildcard);
    let ids = selectors.iter().filter_map(RouteSelector::route_id).collect();
    (ids, wildcard)
}

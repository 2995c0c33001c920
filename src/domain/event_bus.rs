//! Fan-out of monitoring events to WebSocket clients.
//!
//! Sessions publish every state transition and every applied reload.
//! Each `/ws` connection holds one receiver and filters by route itself,
//! so the bus carries events for all routes.

use tokio::sync::broadcast;

use super::MonitorEvent;

/// Cloneable handle to the shared [`MonitorEvent`] channel.
///
/// A full ring buffer drops the oldest events for lagging receivers; the
/// connection loop logs the gap and keeps going.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MonitorEvent>,
}

impl EventBus {
    /// Creates a bus holding up to `capacity` undelivered events
    /// (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns how many receivers got it. With no
    /// connected clients the event is dropped and `0` is returned.
    pub fn publish(&self, event: MonitorEvent) -> usize {
        let kind = event.event_type_str();
        let route_id = event.route_id();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(event = kind, %route_id, delivered, "event published");
        delivered
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers, one per open WebSocket connection.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{RouteId, SessionId};

    fn started(session_id: SessionId, route: i32) -> MonitorEvent {
        MonitorEvent::MonitoringStarted {
            session_id,
            route_id: RouteId::new(route),
            period_secs: 300,
            timestamp: Utc::now(),
        }
    }

    fn stopped(session_id: SessionId, route: i32) -> MonitorEvent {
        MonitorEvent::MonitoringStopped {
            session_id,
            route_id: RouteId::new(route),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn events_without_clients_are_dropped() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(started(SessionId::new(), 1)), 0);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let bus = EventBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.publish(started(SessionId::new(), 1)), 1);
    }

    #[tokio::test]
    async fn clients_see_events_in_publish_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let first = SessionId::new();
        let second = SessionId::new();

        bus.publish(started(first, 5));
        bus.publish(started(second, 7));
        bus.publish(stopped(first, 5));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let Ok(event) = rx.recv().await else {
                panic!("expected an event");
            };
            seen.push((event.session_id(), event.route_id(), event.event_type_str()));
        }
        assert_eq!(
            seen,
            vec![
                (first, RouteId::new(5), "monitoring_started"),
                (second, RouteId::new(7), "monitoring_started"),
                (first, RouteId::new(5), "monitoring_stopped"),
            ]
        );
    }

    #[test]
    fn receiver_count_follows_connections() {
        let bus = EventBus::new(16);
        let ws_a = bus.subscribe();
        let _ws_b = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);

        drop(ws_a);
        assert_eq!(bus.receiver_count(), 1);
    }
}

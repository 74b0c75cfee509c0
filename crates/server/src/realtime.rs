//! Realtime fan-out to connected clients.
//!
//! The broadcaster exclusively owns the subscriber registry; the rest of the
//! crate only ever sees the narrow [`Broadcaster::broadcast`] capability.
//! Delivery is fire-and-forget: no acknowledgement, no retry, and a
//! subscriber whose queue is gone is dropped on the next broadcast.

use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One event published to every connected client.
#[derive(Clone, Debug, Serialize)]
pub struct BroadcastEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

#[derive(Default)]
pub struct Broadcaster {
    subscribers: DashMap<Uuid, mpsc::UnboundedSender<BroadcastEvent>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and hand back its event queue.
    #[tracing::instrument(skip(self))]
    pub fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<BroadcastEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    #[tracing::instrument(skip(self))]
    pub fn unsubscribe(&self, id: Uuid) {
        self.subscribers.remove(&id);
    }

    /// Publish an event to all currently-subscribed clients.
    ///
    /// Subscribers whose receiving half has been dropped are pruned here
    /// rather than on disconnect, so a dropped SSE stream costs nothing
    /// until the next broadcast.
    #[tracing::instrument(skip(self, payload))]
    pub fn broadcast(&self, event: &str, payload: serde_json::Value) {
        let message = BroadcastEvent {
            event: event.to_string(),
            payload,
        };
        self.subscribers.retain(|_, tx| tx.send(message.clone()).is_ok());
        tracing::debug!(
            name = "realtime.broadcast",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            event = %message.event,
            subscribers = self.subscribers.len(),
            message = "Broadcast delivered"
        );
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn delivers_to_live_subscribers() {
        let broadcaster = Broadcaster::new();
        let (_id, mut rx) = broadcaster.subscribe();

        broadcaster.broadcast("emergency_alert", json!({"bloodType": "O-"}));

        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.event, "emergency_alert");
        assert_eq!(event.payload["bloodType"], "O-");
    }

    #[tokio::test]
    async fn prunes_dropped_subscribers() {
        let broadcaster = Broadcaster::new();
        let (_id, rx) = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        drop(rx);
        broadcaster.broadcast("emergency_alert", json!({}));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn unsubscribe_removes_entry() {
        let broadcaster = Broadcaster::new();
        let (id, _rx) = broadcaster.subscribe();
        broadcaster.unsubscribe(id);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}

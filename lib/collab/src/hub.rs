//! Subscription hub.
//!
//! Listeners register for one event name, or for [`WILDCARD`] to receive
//! everything, and get a [`Subscription`] back. The subscription is the
//! only way to stop listening: cancelling or dropping it removes the
//! listener, so forgotten handlers cannot pile up.

use crate::message::{WILDCARD, WireMessage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;
use tracing::trace;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<String, Vec<(u64, mpsc::UnboundedSender<WireMessage>)>>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // Registry updates are single map operations; a panic cannot leave one
    // half applied.
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out of incoming messages to local subscribers.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionHub {
    registry: Arc<Mutex<Registry>>,
}

impl SubscriptionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for an event name.
    #[must_use]
    pub fn subscribe(&self, event: impl Into<String>) -> Subscription {
        let event = event.into();
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .listeners
                .entry(event.clone())
                .or_default()
                .push((id, sender));
            id
        };
        trace!(%event, id, "subscribed");
        Subscription {
            event,
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers a message to its event's listeners and to wildcard
    /// listeners. Returns how many listeners received it.
    pub fn publish(&self, message: &WireMessage) -> usize {
        let registry = lock(&self.registry);
        let mut names = vec![message.event.as_str()];
        if message.event != WILDCARD {
            names.push(WILDCARD);
        }

        names
            .into_iter()
            .filter_map(|name| registry.listeners.get(name))
            .flatten()
            .filter(|(_, sender)| sender.send(message.clone()).is_ok())
            .count()
    }

    /// Number of live listeners for an exact event name.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.registry)
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }
}

/// A registered listener. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    event: String,
    id: u64,
    receiver: mpsc::UnboundedReceiver<WireMessage>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    /// The event name this subscription listens for.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Waits for the next message. Returns `None` once the hub is gone and
    /// every queued message has been received.
    pub async fn recv(&mut self) -> Option<WireMessage> {
        self.receiver.recv().await
    }

    /// Returns a queued message without waiting.
    pub fn try_recv(&mut self) -> Option<WireMessage> {
        self.receiver.try_recv().ok()
    }

    /// Stops listening.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(listeners) = registry.listeners.get_mut(&self.event) {
            listeners.retain(|(id, _)| *id != self.id);
            if listeners.is_empty() {
                registry.listeners.remove(&self.event);
            }
        }
        trace!(event = %self.event, id = self.id, "unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delivers_by_event_name() {
        let hub = SubscriptionHub::new();
        let mut moves = hub.subscribe("node:moved");
        let mut deletes = hub.subscribe("node:deleted");

        let delivered = hub.publish(&WireMessage::new("node:moved", json!({"id": "n1"})));

        assert_eq!(delivered, 1);
        assert_eq!(moves.try_recv().map(|m| m.data["id"].clone()), Some(json!("n1")));
        assert!(deletes.try_recv().is_none());
    }

    #[test]
    fn wildcard_receives_everything_once() {
        let hub = SubscriptionHub::new();
        let mut all = hub.subscribe(WILDCARD);

        hub.publish(&WireMessage::new("a", json!(null)));
        hub.publish(&WireMessage::new(WILDCARD, json!(null)));

        assert_eq!(all.try_recv().map(|m| m.event), Some("a".to_string()));
        assert_eq!(all.try_recv().map(|m| m.event), Some("*".to_string()));
        assert!(all.try_recv().is_none());
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let hub = SubscriptionHub::new();
        let first = hub.subscribe("edit");
        let second = hub.subscribe("edit");
        assert_eq!(hub.listener_count("edit"), 2);

        drop(first);
        assert_eq!(hub.listener_count("edit"), 1);

        second.cancel();
        assert_eq!(hub.listener_count("edit"), 0);
        assert_eq!(hub.publish(&WireMessage::new("edit", json!(null))), 0);
    }

    #[test]
    fn subscription_outliving_hub() {
        let hub = SubscriptionHub::new();
        let mut subscription = hub.subscribe("edit");
        hub.publish(&WireMessage::new("edit", json!(1)));
        drop(hub);

        assert!(subscription.try_recv().is_some());
        drop(subscription);
    }
}

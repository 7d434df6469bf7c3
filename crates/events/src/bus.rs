//! Broadcast bus carrying monitor trace events

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::EventEnvelope;

/// Capacity of the broadcast channel
const DEFAULT_CAPACITY: usize = 256;

/// Publish/subscribe bus for monitor trace events.
///
/// Cloning is cheap; all clones share the same channel. Events
/// published while no subscriber exists are dropped.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    published: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total number of events published on this bus.
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("published_count", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MonitorEvent;
    use scenario_core::Scenario;

    fn start_event() -> EventEnvelope {
        EventEnvelope::new(MonitorEvent::ScenarioStart {
            scenario: Scenario::ApplicationLoad,
            required_phases: vec![],
            timeout_ms: 1_000,
        })
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let envelope = start_event();
        let id = envelope.id;
        assert_eq!(bus.publish(envelope), 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, id);
    }

    #[tokio::test]
    async fn test_dropped_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(start_event()), 0);
        assert_eq!(bus.published_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let envelope = start_event();
        let id = envelope.id;
        assert_eq!(bus.publish(envelope), 2);

        assert_eq!(rx1.recv().await.unwrap().id, id);
        assert_eq!(rx2.recv().await.unwrap().id, id);
    }

    #[test]
    fn test_clone_shares_channel() {
        let bus = EventBus::new();
        let clone = bus.clone();

        let _rx = clone.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(start_event());
        assert_eq!(clone.published_count(), 1);
    }
}

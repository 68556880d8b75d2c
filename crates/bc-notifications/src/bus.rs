//! Typed event bus
//!
//! Each subscriber owns an unbounded queue, so every published event is
//! delivered to it exactly once and in publish order. Dropping the
//! [`Subscription`] closes its queue; closed queues are pruned on the
//! next publish.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::message::{ConsoleEvent, EventError, EventKind};

struct Subscriber {
    id: u64,
    kinds: Option<HashSet<EventKind>>,
    sender: UnboundedSender<ConsoleEvent>,
}

impl Subscriber {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Fan-out of normalized events to any number of subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    state: Arc<Mutex<BusState>>,
}

/// Receiving end of one subscriber
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: UnboundedReceiver<ConsoleEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event; `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<ConsoleEvent> {
        self.receiver.recv().await
    }

    /// Next queued event without waiting
    pub fn try_recv(&mut self) -> Option<ConsoleEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&self) -> Subscription {
        self.register(None)
    }

    /// Receive only events of the given kinds
    pub fn subscribe_with(&self, kinds: impl IntoIterator<Item = EventKind>) -> Subscription {
        self.register(Some(kinds.into_iter().collect()))
    }

    fn register(&self, kinds: Option<HashSet<EventKind>>) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push(Subscriber { id, kinds, sender });
        tracing::debug!(subscriber = id, "subscribed");
        Subscription { id, receiver }
    }

    /// Deliver `event` to every interested subscriber; returns how many got it
    pub fn publish(&self, event: ConsoleEvent) -> usize {
        let kind = event.kind();
        let mut state = self.state.lock();
        let mut delivered = 0;
        state.subscribers.retain(|subscriber| {
            if subscriber.sender.is_closed() {
                tracing::debug!(subscriber = subscriber.id, "pruning closed subscriber");
                return false;
            }
            if subscriber.wants(kind) {
                if subscriber.sender.send(event.clone()).is_err() {
                    return false;
                }
                delivered += 1;
            }
            true
        });
        delivered
    }

    /// Parse a raw socket frame and publish it.
    ///
    /// Unrecognized event types and undecodable frames are logged and
    /// dropped; `None` means nothing was published.
    pub fn dispatch_frame(&self, frame: &str) -> Option<usize> {
        match ConsoleEvent::from_frame(frame) {
            Ok(event) => {
                let kind = event.kind();
                let delivered = self.publish(event);
                tracing::debug!(event = kind.as_str(), delivered, "dispatched");
                Some(delivered)
            }
            Err(EventError::Unrecognized(event_type)) => {
                tracing::debug!(%event_type, "ignoring unrecognized event");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "dropping push frame");
                None
            }
        }
    }

    /// Live subscribers
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock();
        state.subscribers.retain(|s| !s.sender.is_closed());
        state.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use bc_models::BuildStatus;

    use super::*;
    use crate::message::BuildStatusUpdate;

    fn status_frame(id: i64, status: &str) -> String {
        format!(
            r#"{{"eventType":"BUILD_STATUS_CHANGED","payload":{{"id":{},"status":"{}"}}}}"#,
            id, status
        )
    }

    fn build_id(event: ConsoleEvent) -> i64 {
        match event {
            ConsoleEvent::BuildStatusChanged(update) => update.id,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_every_subscriber_gets_every_event_in_order() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        for id in 1..=3 {
            assert_eq!(bus.dispatch_frame(&status_frame(id, "BUILDING")), Some(2));
        }

        for subscription in [&mut first, &mut second] {
            for id in 1..=3 {
                assert_eq!(build_id(subscription.recv().await.unwrap()), id);
            }
            assert!(subscription.try_recv().is_none());
        }
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let bus = EventBus::new();
        let mut kept = bus.subscribe();
        let dropped = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(dropped);
        let delivered = bus.publish(ConsoleEvent::BuildStatusChanged(BuildStatusUpdate::new(
            1,
            BuildStatus::Success,
        )));
        assert_eq!(delivered, 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert!(kept.try_recv().is_some());
    }

    #[test]
    fn test_unknown_and_malformed_frames_deliver_nothing() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe();

        assert_eq!(
            bus.dispatch_frame(r#"{"eventType":"SOMETHING_ELSE","payload":{"id":1}}"#),
            None
        );
        assert_eq!(
            bus.dispatch_frame(r#"{"eventType":"BUILD_STATUS_CHANGED","payload":[]}"#),
            None
        );
        assert_eq!(bus.dispatch_frame("{"), None);
        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn test_filtered_subscription() {
        let bus = EventBus::new();
        let mut maintenance =
            bus.subscribe_with([EventKind::MaintenanceModeOn, EventKind::MaintenanceModeOff]);

        bus.dispatch_frame(&status_frame(5, "FAILED"));
        bus.dispatch_frame(r#"{"eventType":"MAINTENANCE_MODE_OFF"}"#);

        assert_eq!(maintenance.try_recv(), Some(ConsoleEvent::MaintenanceModeOff));
        assert_eq!(maintenance.try_recv(), None);
    }
}

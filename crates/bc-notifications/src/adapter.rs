//! Pumps a push channel into the event bus

use std::fmt::Display;

use bc_core::error::ConsoleError;
use bc_core::result::ConsoleResult;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::bus::EventBus;

/// A boxed stream of text frames, e.g. the text messages of a websocket.
///
/// [`EventBusAdapter::run`] accepts any such stream, boxed or not.
pub type PushChannel<E> = BoxStream<'static, Result<String, E>>;

/// Counters for one run of the adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStats {
    pub frames: u64,
    pub published: u64,
    pub ignored: u64,
}

/// Reads frames from a push channel and publishes them on an [`EventBus`]
#[derive(Clone)]
pub struct EventBusAdapter {
    bus: EventBus,
}

impl EventBusAdapter {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Dispatch frames in arrival order until the channel ends.
    ///
    /// A transport error ends the run with [`ConsoleError::Network`].
    pub async fn run<S, E>(&self, channel: S) -> ConsoleResult<AdapterStats>
    where
        S: Stream<Item = Result<String, E>>,
        E: Display,
    {
        let mut channel = Box::pin(channel);
        let mut stats = AdapterStats::default();
        tracing::info!("push channel attached");

        while let Some(frame) = channel.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::warn!(error = %err, frames = stats.frames, "push channel failed");
                    return Err(ConsoleError::Network(err.to_string()));
                }
            };

            stats.frames += 1;
            if frame.trim().is_empty() {
                stats.ignored += 1;
                continue;
            }
            match self.bus.dispatch_frame(&frame) {
                Some(_) => stats.published += 1,
                None => stats.ignored += 1,
            }
        }

        tracing::info!(
            frames = stats.frames,
            published = stats.published,
            ignored = stats.ignored,
            "push channel closed"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;

    use super::*;
    use crate::message::ConsoleEvent;

    fn frames(
        items: Vec<Result<&'static str, &'static str>>,
    ) -> impl Stream<Item = Result<String, &'static str>> {
        stream::iter(items.into_iter().map(|item| item.map(str::to_string)))
    }

    #[tokio::test]
    async fn test_run_dispatches_in_order() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe();
        let adapter = EventBusAdapter::new(bus);

        let stats = adapter
            .run(frames(vec![
                Ok(r#"{"eventType":"MAINTENANCE_MODE_ON"}"#),
                Ok(r#"{"eventType":"PING"}"#),
                Ok(""),
                Ok(r#"{"eventType":"NEW_ANNOUNCEMENT","payload":{"banner":"Upgrade at 18:00"}}"#),
                Ok(r#"{"eventType":"MAINTENANCE_MODE_OFF"}"#),
            ]))
            .await
            .unwrap();

        assert_eq!(
            stats,
            AdapterStats {
                frames: 5,
                published: 3,
                ignored: 2
            }
        );
        assert_eq!(subscription.try_recv(), Some(ConsoleEvent::MaintenanceModeOn));
        assert!(matches!(
            subscription.try_recv(),
            Some(ConsoleEvent::Announcement(a)) if a.banner == "Upgrade at 18:00"
        ));
        assert_eq!(subscription.try_recv(), Some(ConsoleEvent::MaintenanceModeOff));
    }

    #[tokio::test]
    async fn test_transport_error_ends_run() {
        let bus = EventBus::new();
        let mut subscription = bus.subscribe();
        let adapter = EventBusAdapter::new(bus);

        let err = adapter
            .run(frames(vec![
                Ok(r#"{"eventType":"MAINTENANCE_MODE_ON"}"#),
                Err("connection reset"),
                Ok(r#"{"eventType":"MAINTENANCE_MODE_OFF"}"#),
            ]))
            .await
            .unwrap_err();

        assert_eq!(err, ConsoleError::Network("connection reset".into()));
        assert_eq!(subscription.try_recv(), Some(ConsoleEvent::MaintenanceModeOn));
        assert_eq!(subscription.try_recv(), None);
    }
}

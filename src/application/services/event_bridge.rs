//! # Event Bridge
//!
//! Fan-out of contract events to real-time subscribers.
//!
//! The [`EventBridge`] subscribes once to a single contract event and hands
//! every delivery to the [`SubscriberRegistry`], which forwards it to each
//! connected subscriber over an unbounded channel.
//!
//! ```text
//! ChainEventSource ──stream──> EventBridge ──broadcast──> SubscriberRegistry
//!                                                         ├──> subscriber 1
//!                                                         ├──> subscriber 2
//!                                                         └──> ...
//! ```
//!
//! Subscription errors are logged and never re-subscribed.

use crate::application::error::ApplicationResult;
use crate::domain::events::ChainEvent;
use crate::infrastructure::blockchain::{ChainEventSource, EventFilterSpec};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Identifier of a registered subscriber.
pub type SubscriberId = Uuid;

// ============================================================================
// Subscriber Registry
// ============================================================================

/// Receiving end of a registry subscription.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: UnboundedReceiver<Arc<ChainEvent>>,
}

impl Subscription {
    /// Returns the subscriber id, used to unregister.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the subscriber has been unregistered.
    pub async fn recv(&mut self) -> Option<Arc<ChainEvent>> {
        self.receiver.recv().await
    }

    /// Returns the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<ChainEvent>> {
        self.receiver.try_recv().ok()
    }
}

/// Set of connected real-time subscribers.
///
/// Cloning shares the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct SubscriberRegistry {
    subscribers: Arc<RwLock<HashMap<SubscriberId, UnboundedSender<Arc<ChainEvent>>>>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub async fn register(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.write().await.insert(id, sender);
        debug!(subscriber_id = %id, "Subscriber registered");
        Subscription { id, receiver }
    }

    /// Removes a subscriber. Returns false if it was not registered.
    pub async fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            debug!(subscriber_id = %id, "Subscriber unregistered");
        }
        removed
    }

    /// Sends the event to every subscriber.
    ///
    /// Returns how many subscribers received it. Subscribers whose receiving
    /// end was dropped are removed.
    pub async fn broadcast(&self, event: ChainEvent) -> usize {
        let event = Arc::new(event);
        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in self.subscribers.read().await.iter() {
            if sender.send(Arc::clone(&event)).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &closed {
                subscribers.remove(id);
            }
            debug!(pruned = closed.len(), "Pruned closed subscribers");
        }

        delivered
    }

    /// Returns the number of registered subscribers.
    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Returns true if no subscriber is registered.
    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

// ============================================================================
// Event Bridge
// ============================================================================

/// Relays one contract event from the chain to the registry.
#[derive(Debug)]
pub struct EventBridge {
    source: Arc<dyn ChainEventSource>,
    registry: SubscriberRegistry,
    filter: EventFilterSpec,
}

impl EventBridge {
    /// Creates a new bridge.
    #[must_use]
    pub fn new(
        source: Arc<dyn ChainEventSource>,
        registry: SubscriberRegistry,
        filter: EventFilterSpec,
    ) -> Self {
        Self {
            source,
            registry,
            filter,
        }
    }

    /// Subscribes and forwards events until the stream ends.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::SubscriptionFailed` if the subscription
    /// cannot be opened.
    pub async fn run(self) -> ApplicationResult<()> {
        let mut events = self.source.subscribe(&self.filter).await?;
        info!(
            event = %self.filter.name,
            contract = ?self.filter.contract,
            "Subscribed to contract event"
        );

        while let Some(next) = events.next().await {
            match next {
                Ok(event) => {
                    let delivered = self.registry.broadcast(event).await;
                    debug!(event = %self.filter.name, delivered, "Event broadcast");
                }
                Err(e) => {
                    warn!(event = %self.filter.name, error = %e, "Event subscription error");
                }
            }
        }

        warn!(event = %self.filter.name, "Event stream ended");
        Ok(())
    }

    /// Runs the bridge on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run().await {
                error!(error = %e, "Event bridge stopped");
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::error::ApplicationError;
    use crate::infrastructure::blockchain::{ChainError, ChainResult, EventStream};
    use async_trait::async_trait;
    use ethers::types::Address;
    use std::sync::Mutex;

    fn event(n: u32) -> ChainEvent {
        ChainEvent::from_json("EtherTransfer", format!(r#"{{"n": {n}}}"#)).unwrap()
    }

    fn filter() -> EventFilterSpec {
        EventFilterSpec::new(
            Address::repeat_byte(1),
            "EtherTransfer",
            "EtherTransfer(address,address,uint256)",
        )
    }

    #[derive(Debug)]
    struct MockEventSource {
        items: Mutex<Option<Vec<ChainResult<ChainEvent>>>>,
        fail: bool,
    }

    impl MockEventSource {
        fn with_items(items: Vec<ChainResult<ChainEvent>>) -> Self {
            Self {
                items: Mutex::new(Some(items)),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                items: Mutex::new(None),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ChainEventSource for MockEventSource {
        async fn subscribe(&self, _filter: &EventFilterSpec) -> ChainResult<EventStream> {
            if self.fail {
                return Err(ChainError::subscription("websocket closed"));
            }
            let items = self.items.lock().unwrap().take().unwrap_or_default();
            Ok(futures::stream::iter(items).boxed())
        }
    }

    #[tokio::test]
    async fn register_and_unregister() {
        let registry = SubscriberRegistry::new();
        let a = registry.register().await;
        let b = registry.register().await;
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len().await, 2);

        assert!(registry.unregister(a.id()).await);
        assert!(!registry.unregister(a.id()).await);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let registry = SubscriberRegistry::new();
        let mut a = registry.register().await;
        let mut b = registry.register().await;

        assert_eq!(registry.broadcast(event(1)).await, 2);

        assert_eq!(a.recv().await.unwrap().payload_json(), r#"{"n": 1}"#);
        assert_eq!(b.recv().await.unwrap().payload_json(), r#"{"n": 1}"#);
    }

    #[tokio::test]
    async fn broadcast_prunes_dropped_subscribers() {
        let registry = SubscriberRegistry::new();
        let _kept = registry.register().await;
        let dropped = registry.register().await;
        drop(dropped);

        assert_eq!(registry.broadcast(event(1)).await, 1);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn broadcast_without_subscribers() {
        let registry = SubscriberRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.broadcast(event(1)).await, 0);
    }

    #[tokio::test]
    async fn unregistered_subscription_ends() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.register().await;
        registry.unregister(sub.id()).await;
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn bridge_forwards_in_delivery_order_and_skips_errors() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.register().await;
        let source = Arc::new(MockEventSource::with_items(vec![
            Ok(event(1)),
            Err(ChainError::subscription("bad log")),
            Ok(event(2)),
        ]));

        EventBridge::new(source, registry.clone(), filter())
            .run()
            .await
            .unwrap();

        assert_eq!(sub.try_recv().unwrap().payload_json(), r#"{"n": 1}"#);
        assert_eq!(sub.try_recv().unwrap().payload_json(), r#"{"n": 2}"#);
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn bridge_reports_subscription_failure() {
        let source = Arc::new(MockEventSource::failing());
        let err = EventBridge::new(source, SubscriberRegistry::new(), filter())
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::SubscriptionFailed(_)));
    }

    #[tokio::test]
    async fn spawned_bridge_completes() {
        let registry = SubscriberRegistry::new();
        let mut sub = registry.register().await;
        let source = Arc::new(MockEventSource::with_items(vec![Ok(event(7))]));

        EventBridge::new(source, registry, filter())
            .spawn()
            .await
            .unwrap();

        assert_eq!(sub.recv().await.unwrap().name(), "EtherTransfer");
    }
}

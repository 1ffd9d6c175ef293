//! Subscription manager for broadcasting store events.

use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use super::types::{DropReason, StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId};
use crate::types::Item;

/// Internal subscription state.
struct Subscription {
    sender: Sender<StoreEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if buffer is full or the receiver is gone.
    fn try_send(&self, event: StoreEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(crossbeam_channel::TrySendError::Full(_)) => false,
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Manages subscriptions and broadcasts events.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Why each removed subscription went away, until its owner asks.
    dropped: RwLock<HashMap<SubscriptionId, DropReason>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            dropped: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription.
    pub fn subscribe(&self, config: &SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        // A zero-capacity channel would be a rendezvous channel and drop on first send.
        let (sender, receiver) = bounded(config.buffer_size.max(1));

        self.subscriptions.write().insert(id, Subscription { sender });
        debug!(subscription = id.0, "subscribed");

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            debug!(subscription = id.0, "unsubscribed");
            self.close(id, sub, DropReason::Unsubscribed);
        }
    }

    /// Why `id` was removed, if it was. The record is consumed.
    ///
    /// Unlike the `Dropped` event this never gets lost to a full buffer.
    pub fn take_drop_reason(&self, id: SubscriptionId) -> Option<DropReason> {
        self.dropped.write().remove(&id)
    }

    /// Record the reason, then tell the receiver (best effort).
    fn close(&self, id: SubscriptionId, sub: Subscription, reason: DropReason) {
        self.dropped.write().insert(id, reason.clone());
        let _ = sub.sender.try_send(StoreEvent::Dropped { reason });
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Check whether a subscription is still registered.
    pub fn is_active(&self, id: SubscriptionId) -> bool {
        self.subscriptions.read().contains_key(&id)
    }

    /// Broadcast a collection change to every subscription.
    pub fn broadcast_change(&self, revision: u64, items: &[Item]) {
        let event = StoreEvent::Changed {
            revision,
            items: items.to_vec(),
        };
        self.broadcast(event);
    }

    /// Send an event directly to one subscription.
    /// Returns false if the subscription was dropped.
    pub fn send_to(&self, id: SubscriptionId, event: StoreEvent) -> bool {
        let delivered = {
            let subs = self.subscriptions.read();
            match subs.get(&id) {
                Some(sub) => sub.try_send(event),
                None => return false,
            }
        };
        if !delivered {
            self.drop_subscriptions(vec![id]);
        }
        delivered
    }

    /// Internal broadcast helper. Drops subscribers that fail to receive.
    fn broadcast(&self, event: StoreEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            self.drop_subscriptions(to_remove);
        }
    }

    fn drop_subscriptions(&self, ids: Vec<SubscriptionId>) {
        let mut subs = self.subscriptions.write();
        for id in ids {
            if let Some(sub) = subs.remove(&id) {
                warn!(subscription = id.0, "dropping slow subscriber");
                self.close(id, sub, DropReason::BufferOverflow);
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, ItemId};
    use std::time::Duration;

    fn make_items(n: u64) -> Vec<Item> {
        (0..n)
            .map(|i| Item {
                id: ItemId(i),
                name: format!("item-{}", i),
                count: 0,
                category: Some(Category::Vehicle),
            })
            .collect()
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let manager = SubscriptionManager::new();

        let handle = manager.subscribe(&SubscriptionConfig::default());
        assert_eq!(manager.subscription_count(), 1);

        manager.unsubscribe(handle.id);
        assert_eq!(manager.subscription_count(), 0);

        let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        assert!(matches!(
            event,
            StoreEvent::Dropped {
                reason: DropReason::Unsubscribed
            }
        ));
        assert_eq!(manager.take_drop_reason(handle.id), Some(DropReason::Unsubscribed));
        assert_eq!(manager.take_drop_reason(handle.id), None);
    }

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let manager = SubscriptionManager::new();
        let a = manager.subscribe(&SubscriptionConfig::default());
        let b = manager.subscribe(&SubscriptionConfig::default());

        manager.broadcast_change(3, &make_items(2));

        for handle in [&a, &b] {
            match handle.recv_timeout(Duration::from_millis(100)).unwrap() {
                StoreEvent::Changed { revision, items } => {
                    assert_eq!(revision, 3);
                    assert_eq!(items.len(), 2);
                }
                other => panic!("Expected Changed event, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_drop_slow_subscriber() {
        let manager = SubscriptionManager::new();
        let config = SubscriptionConfig {
            buffer_size: 2,
            ..Default::default()
        };
        let handle = manager.subscribe(&config);

        for revision in 0..10 {
            manager.broadcast_change(revision, &make_items(1));
        }

        assert_eq!(manager.subscription_count(), 0);
        assert_eq!(
            manager.take_drop_reason(handle.id),
            Some(DropReason::BufferOverflow)
        );
    }

    #[test]
    fn test_send_to_unknown_subscription() {
        let manager = SubscriptionManager::new();
        let delivered = manager.send_to(
            SubscriptionId(42),
            StoreEvent::Changed {
                revision: 0,
                items: vec![],
            },
        );
        assert!(!delivered);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = StoreEvent::Dropped {
            reason: DropReason::BufferOverflow,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "dropped");
        assert_eq!(value["reason"], "buffer_overflow");

        let event: StoreEvent = serde_json::from_str(
            r#"{"type": "changed", "revision": 2, "items": [{"id": 1, "name": "apple", "count": 1}]}"#,
        )
        .unwrap();
        match event {
            StoreEvent::Changed { revision, items } => {
                assert_eq!(revision, 2);
                assert_eq!(items[0].category, None);
            }
            other => panic!("Expected Changed event, got {:?}", other),
        }
    }
}

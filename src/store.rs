//! Observable, ordered item store.

use crate::error::Result;
use crate::subscriptions::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
use crate::types::{Category, Item, ItemId, ItemInput};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Store configuration.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    /// Items created when the store is constructed, in order.
    pub seed: Vec<ItemInput>,
}

impl StoreConfig {
    /// The bundled demo collection: three categories of icons.
    pub fn icons() -> Self {
        let icons = [
            ("car", Category::Vehicle),
            ("bus", Category::Vehicle),
            ("bicycle", Category::Vehicle),
            ("airplane", Category::Vehicle),
            ("moon", Category::Weather),
            ("cloud", Category::Weather),
            ("tornado", Category::Weather),
            ("person", Category::Person),
            ("eyes", Category::Person),
        ];
        Self {
            seed: icons
                .iter()
                .map(|(name, category)| ItemInput::new(*name, *category))
                .collect(),
        }
    }

    /// The bundled unsectioned demo list: five fruit rows.
    pub fn fruits() -> Self {
        Self {
            seed: ["apple", "banana", "grape", "lemon", "melon"]
                .into_iter()
                .map(ItemInput::row)
                .collect(),
        }
    }
}

struct Inner {
    items: Vec<Item>,
    revision: u64,
}

/// Ordered collection of uniquely identified items.
///
/// The collection is always sorted descending by `count`; the sort is
/// stable, so ties keep their previous relative order. Every successful
/// mutation bumps the revision and broadcasts the new collection to
/// subscribers before returning.
pub struct ItemStore {
    inner: RwLock<Inner>,
    next_id: AtomicU64,
    subscriptions: SubscriptionManager,
}

impl ItemStore {
    /// Create a store from a configuration.
    pub fn new(config: StoreConfig) -> Self {
        let store = Self {
            inner: RwLock::new(Inner {
                items: Vec::with_capacity(config.seed.len()),
                revision: 0,
            }),
            next_id: AtomicU64::new(1),
            subscriptions: SubscriptionManager::new(),
        };
        {
            let mut inner = store.inner.write();
            for input in config.seed {
                let item = store.make_item(input);
                inner.items.push(item);
            }
            sort_by_count(&mut inner.items);
        }
        store
    }

    /// Create a store seeded from a JSON array of item inputs.
    pub fn from_json(json: &str) -> Result<Self> {
        let seed: Vec<ItemInput> = serde_json::from_str(json)?;
        Ok(Self::new(StoreConfig { seed }))
    }

    fn make_item(&self, input: ItemInput) -> Item {
        Item {
            id: ItemId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            name: input.name,
            count: input.count,
            category: input.category,
        }
    }

    // --- Mutations ---

    /// Create a new item and return its identity.
    pub fn insert(&self, input: ItemInput) -> ItemId {
        let item = self.make_item(input);
        let id = item.id;

        let mut inner = self.inner.write();
        inner.items.push(item);
        sort_by_count(&mut inner.items);
        debug!(item = %id, "inserted item");
        self.publish(&mut inner);

        id
    }

    /// Apply `transform` to the item with identity `id`, then re-sort.
    ///
    /// Returns false (and notifies nobody) if no such item exists.
    pub fn mutate<F>(&self, id: ItemId, transform: F) -> bool
    where
        F: FnOnce(&mut Item),
    {
        let mut inner = self.inner.write();
        let Some(item) = inner.items.iter_mut().find(|item| item.id == id) else {
            trace!(item = %id, "mutate on unknown item ignored");
            return false;
        };

        transform(item);
        // Identity is immutable for the item's lifetime.
        item.id = id;

        sort_by_count(&mut inner.items);
        debug!(item = %id, "mutated item");
        self.publish(&mut inner);

        true
    }

    /// Bump the counter of the item with identity `id`.
    pub fn increment(&self, id: ItemId) -> bool {
        self.mutate(id, |item| item.count += 1)
    }

    /// Remove the item with identity `id`.
    ///
    /// Returns false if no such item exists.
    pub fn remove(&self, id: ItemId) -> bool {
        let mut inner = self.inner.write();
        let Some(position) = inner.items.iter().position(|item| item.id == id) else {
            trace!(item = %id, "remove on unknown item ignored");
            return false;
        };

        inner.items.remove(position);
        debug!(item = %id, "removed item");
        self.publish(&mut inner);

        true
    }

    fn publish(&self, inner: &mut Inner) {
        inner.revision += 1;
        self.subscriptions
            .broadcast_change(inner.revision, &inner.items);
    }

    // --- Reads ---

    /// The current ordered collection.
    pub fn list(&self) -> Vec<Item> {
        self.inner.read().items.clone()
    }

    /// Get an item by identity.
    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.inner.read().items.iter().find(|item| item.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    /// Number of successful mutations so far.
    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }

    // --- Subscriptions ---

    /// Subscribe to change notifications.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        // Hold the read lock so no change can slip in between registering
        // and replaying the current collection.
        let inner = self.inner.read();
        let handle = self.subscriptions.subscribe(&config);
        if config.replay_current {
            self.subscriptions.send_to(
                handle.id,
                StoreEvent::Changed {
                    revision: inner.revision,
                    items: inner.items.clone(),
                },
            );
        }
        handle
    }

    /// Stop delivering notifications to a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    /// Whether a subscription is still registered (not unsubscribed or dropped).
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscriptions.is_active(id)
    }

    /// Why a subscription was removed, if it was. Consumes the record.
    pub fn take_drop_reason(&self, id: SubscriptionId) -> Option<DropReason> {
        self.subscriptions.take_drop_reason(id)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

/// Stable sort, descending by counter.
fn sort_by_count(items: &mut [Item]) {
    items.sort_by(|a, b| b.count.cmp(&a.count));
}

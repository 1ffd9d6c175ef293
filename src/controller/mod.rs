//! Wiring between the item store, the reconciler, and a list view.
//!
//! A [`ListController`] subscribes to an [`ItemStore`], turns every change
//! notification into a snapshot, diffs it against the snapshot it last
//! applied, and hands the edit script to its [`ListView`]. Gestures are
//! resolved to identities from what the view renders at the moment they
//! are handled.
//!
//! Everything runs on the caller's thread. Each notification is diffed
//! and applied to completion before the next one is taken.

mod scheduler;

pub use scheduler::{Mutation, Scheduler, TaskId};

use crate::diff::diff;
use crate::error::{DiffError, Result};
use crate::snapshot::{item_category, main_section, Snapshot, SnapshotBuilder};
use crate::store::ItemStore;
use crate::subscriptions::{DropReason, StoreEvent, SubscriptionConfig, SubscriptionHandle};
use crate::types::{Category, IndexPath, Item, ItemId, Section};
use crate::view::ListView;
use crossbeam_channel::TryRecvError;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Controller configuration.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Delay between a tap and the increment it requests.
    /// Default: zero (immediate)
    pub increment_delay: Duration,

    /// Animate scripts that follow a store change.
    /// Default: true
    pub animate: bool,

    /// Subscription settings used against the store.
    pub subscription: SubscriptionConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            increment_delay: Duration::ZERO,
            animate: true,
            subscription: SubscriptionConfig::default(),
        }
    }
}

/// Maps a store item to its section key. `None` keeps it out of the list.
pub type SectionOf<S> = fn(&Item) -> Option<S>;

/// Drives a [`ListView`] from an [`ItemStore`].
///
/// `S` is the section key: [`Category`] for the sectioned icon list,
/// [`Section`] for a plain list with one implicit section.
pub struct ListController<S, V>
where
    S: Clone + Eq + Hash + Debug,
    V: ListView<S, Item>,
{
    store: Arc<ItemStore>,
    view: V,
    builder: SnapshotBuilder<S>,
    section_of: SectionOf<S>,
    config: ControllerConfig,
    subscription: Option<SubscriptionHandle>,
    /// The snapshot the view last fully applied.
    last_applied: Snapshot<S, Item>,
    last_revision: u64,
    scheduler: Scheduler,
    torn_down: bool,
}

impl<V> ListController<Category, V>
where
    V: ListView<Category, Item>,
{
    /// One section per category, every category always shown.
    pub fn sectioned(store: Arc<ItemStore>, view: V, config: ControllerConfig) -> Result<Self> {
        Self::new(store, view, SnapshotBuilder::by_category(), item_category, config)
    }
}

impl<V> ListController<Section, V>
where
    V: ListView<Section, Item>,
{
    /// Every item in a single implicit section.
    pub fn unsectioned(store: Arc<ItemStore>, view: V, config: ControllerConfig) -> Result<Self> {
        Self::new(store, view, SnapshotBuilder::single(), main_section, config)
    }
}

impl<S, V> ListController<S, V>
where
    S: Clone + Eq + Hash + Debug,
    V: ListView<S, Item>,
{
    /// Attach to `store` and render its current collection into `view`.
    pub fn new(
        store: Arc<ItemStore>,
        view: V,
        builder: SnapshotBuilder<S>,
        section_of: SectionOf<S>,
        config: ControllerConfig,
    ) -> Result<Self> {
        let subscription = store.subscribe(config.subscription.clone());
        let last_applied = view.rendered().clone();

        let mut controller = Self {
            store,
            view,
            builder,
            section_of,
            config,
            subscription: Some(subscription),
            last_applied,
            last_revision: 0,
            scheduler: Scheduler::new(),
            torn_down: false,
        };
        controller.resync(false)?;
        info!(
            items = controller.last_applied.item_count(),
            sections = controller.last_applied.section_count(),
            "list controller attached"
        );
        Ok(controller)
    }

    // --- Gestures ---

    /// Handle a tap on the row at `path`: increment that item, now or after
    /// the configured delay.
    ///
    /// Returns the identity the tap resolved to, if any row is rendered there.
    pub fn tap(&mut self, path: IndexPath) -> Result<Option<ItemId>> {
        self.tap_at(path, Instant::now())
    }

    /// [`ListController::tap`] with an explicit clock.
    pub fn tap_at(&mut self, path: IndexPath, now: Instant) -> Result<Option<ItemId>> {
        if self.torn_down {
            return Ok(None);
        }
        let Some(id) = self.resolve(path) else {
            return Ok(None);
        };

        if self.config.increment_delay.is_zero() {
            self.run(Mutation::Increment(id));
            self.pump()?;
        } else {
            self.scheduler
                .schedule(now, self.config.increment_delay, Mutation::Increment(id));
        }
        Ok(Some(id))
    }

    /// Handle a swipe-to-delete on the row at `path`.
    pub fn swipe_delete(&mut self, path: IndexPath) -> Result<Option<ItemId>> {
        if self.torn_down {
            return Ok(None);
        }
        let Some(id) = self.resolve(path) else {
            return Ok(None);
        };

        self.run(Mutation::Remove(id));
        self.pump()?;
        Ok(Some(id))
    }

    /// Run every delayed mutation due at `now`, then apply the results.
    pub fn tick(&mut self, now: Instant) -> Result<usize> {
        if self.torn_down {
            return Ok(0);
        }
        for mutation in self.scheduler.take_due(now) {
            self.run(mutation);
        }
        self.pump()
    }

    fn resolve(&self, path: IndexPath) -> Option<ItemId> {
        self.view.rendered().item_at(path).map(|item| item.id)
    }

    fn run(&self, mutation: Mutation) {
        let found = match mutation {
            Mutation::Increment(id) => self.store.increment(id),
            Mutation::Remove(id) => self.store.remove(id),
        };
        if !found {
            debug!(?mutation, "mutation target no longer exists");
        }
    }

    // --- Notifications ---

    /// Drain pending store notifications, applying one edit script per
    /// notification. Returns how many scripts were applied.
    pub fn pump(&mut self) -> Result<usize> {
        let mut applied = 0;

        loop {
            if self.torn_down {
                return Ok(applied);
            }
            let Some(handle) = self.subscription.as_ref() else {
                return Ok(applied);
            };

            let id = handle.id;

            let reason = match handle.try_recv() {
                Ok(StoreEvent::Changed { revision, items }) => {
                    if revision <= self.last_revision {
                        continue;
                    }
                    let snapshot = self.builder.build(&items, self.section_of);
                    self.sync(snapshot, self.config.animate)?;
                    self.last_revision = revision;
                    applied += 1;
                    continue;
                }
                Ok(StoreEvent::Dropped { reason }) => reason,
                // The Dropped event may have been lost to a full buffer; the
                // store still knows why the channel closed.
                Err(TryRecvError::Disconnected) => self
                    .store
                    .take_drop_reason(id)
                    .unwrap_or(DropReason::BufferOverflow),
                Err(TryRecvError::Empty) => return Ok(applied),
            };
            self.store.take_drop_reason(id);

            match reason {
                DropReason::Unsubscribed => {
                    info!(subscription = id.0, "store subscription closed");
                    self.subscription = None;
                    return Ok(applied);
                }
                DropReason::BufferOverflow => {
                    warn!(subscription = id.0, "store subscription dropped, resubscribing");
                    let handle = self.store.subscribe(self.config.subscription.clone());
                    self.subscription = Some(handle);
                    self.resync(self.config.animate)?;
                    applied += 1;
                }
            }
        }
    }

    /// Whether the controller still receives store notifications.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Rebuild from the store's current collection and apply the difference.
    fn resync(&mut self, animated: bool) -> Result<()> {
        let revision = self.store.revision();
        let snapshot = self.builder.build(&self.store.list(), self.section_of);
        self.sync(snapshot, animated)?;
        self.last_revision = revision;
        Ok(())
    }

    /// Diff `snapshot` against what the view shows and apply it.
    fn sync(&mut self, snapshot: Snapshot<S, Item>, animated: bool) -> Result<()> {
        let ops = if self.view.rendered() == &self.last_applied {
            diff(&self.last_applied, &snapshot)?
        } else {
            warn!("view diverged from last applied snapshot, diffing against the view");
            diff(self.view.rendered(), &snapshot)?
        };

        match self.view.apply(&ops, animated) {
            Ok(()) => {}
            Err(DiffError::StaleApply(reason)) => {
                warn!(%reason, "stale edit script rejected, recomputing");
                let ops = diff(self.view.rendered(), &snapshot)?;
                self.view.apply(&ops, animated)?;
            }
            Err(e) => return Err(e),
        }

        self.last_applied = snapshot;
        Ok(())
    }

    // --- Lifecycle ---

    /// Detach from the store and cancel every delayed mutation. Nothing is
    /// applied to the view afterwards.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        let cancelled = self.scheduler.cancel_all();
        if let Some(handle) = self.subscription.take() {
            self.store.unsubscribe(handle.id);
            self.store.take_drop_reason(handle.id);
        }
        info!(cancelled, "list controller torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // --- Accessors ---

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Direct access to the view. Changes made through it are picked up as
    /// divergence on the next sync.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn store(&self) -> &Arc<ItemStore> {
        &self.store
    }

    /// The snapshot the view last fully applied.
    pub fn last_applied(&self) -> &Snapshot<S, Item> {
        &self.last_applied
    }

    /// Number of delayed mutations still waiting.
    pub fn pending_mutations(&self) -> usize {
        self.scheduler.pending_count()
    }
}

impl<S, V> Drop for ListController<S, V>
where
    S: Clone + Eq + Hash + Debug,
    V: ListView<S, Item>,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use crate::view::Rendering;

    fn controller(config: ControllerConfig) -> ListController<Category, Rendering<Category, Item>> {
        let store = Arc::new(ItemStore::new(StoreConfig::icons()));
        ListController::sectioned(store, Rendering::new(), config).unwrap()
    }

    #[test]
    fn test_initial_render() {
        let controller = controller(ControllerConfig::default());
        let rendered = controller.view().rendered();

        assert_eq!(rendered.section_ids(), Category::ALL.to_vec());
        assert_eq!(rendered.item_count(), 9);
        assert_eq!(rendered.item_at(IndexPath::new(0, 0)).unwrap().name, "car");
        assert!(!controller.view().history()[0].animated);
    }

    #[test]
    fn test_tap_moves_item_to_top_of_section() {
        let mut controller = controller(ControllerConfig::default());

        let tapped = controller.tap(IndexPath::new(0, 2)).unwrap().unwrap();
        let rendered = controller.view().rendered();

        assert_eq!(rendered.item_at(IndexPath::new(0, 0)).unwrap().id, tapped);
        assert_eq!(rendered.item_at(IndexPath::new(0, 0)).unwrap().count, 1);
        assert_eq!(rendered, controller.last_applied());
    }

    #[test]
    fn test_tap_on_empty_position() {
        let mut controller = controller(ControllerConfig::default());
        assert_eq!(controller.tap(IndexPath::new(2, 10)).unwrap(), None);
        assert_eq!(controller.store().revision(), 0);
    }

    #[test]
    fn test_delayed_increment() {
        let mut controller = controller(ControllerConfig {
            increment_delay: Duration::from_millis(500),
            ..Default::default()
        });
        let start = Instant::now();

        controller.tap_at(IndexPath::new(1, 1), start).unwrap();
        assert_eq!(controller.pending_mutations(), 1);
        assert_eq!(controller.tick(start).unwrap(), 0);

        assert_eq!(controller.tick(start + Duration::from_millis(500)).unwrap(), 1);
        assert_eq!(controller.pending_mutations(), 0);
        assert_eq!(controller.view().rendered().item_at(IndexPath::new(1, 0)).unwrap().count, 1);
    }

    #[test]
    fn test_teardown_cancels_and_detaches() {
        let mut controller = controller(ControllerConfig {
            increment_delay: Duration::from_millis(100),
            ..Default::default()
        });
        let start = Instant::now();
        controller.tap_at(IndexPath::new(0, 0), start).unwrap();
        let store = Arc::clone(controller.store());
        assert_eq!(store.subscription_count(), 1);

        controller.teardown();

        assert_eq!(controller.pending_mutations(), 0);
        assert_eq!(store.subscription_count(), 0);
        assert_eq!(controller.tick(start + Duration::from_secs(1)).unwrap(), 0);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Arc::new(ItemStore::new(StoreConfig::icons()));
        {
            let _controller =
                ListController::sectioned(Arc::clone(&store), Rendering::new(), Default::default())
                    .unwrap();
            assert_eq!(store.subscription_count(), 1);
        }
        assert_eq!(store.subscription_count(), 0);
    }
}

//! Subscription system for live store updates.
//!
//! Subscribers receive a [`StoreEvent::Changed`] carrying the full ordered
//! collection after every successful store mutation. Delivery is synchronous
//! with the mutation: the event is queued before the mutating call returns.
//!
//! Subscriptions support:
//! - Bounded buffers with slow-subscriber dropping
//! - Explicit unsubscribe with a final `Dropped` event
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionConfig::default());
//!
//! store.increment(id);
//!
//! match handle.try_recv() {
//!     Ok(StoreEvent::Changed { items, .. }) => println!("{} items", items.len()),
//!     Ok(StoreEvent::Dropped { reason }) => println!("dropped: {:?}", reason),
//!     Err(_) => {}
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{DropReason, StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId};

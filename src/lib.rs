//! # Diffable
//!
//! An observable, ordered item store whose changes are rendered into a
//! sectioned list through explicit edit scripts.
//!
//! ## Core Concepts
//!
//! - **Items**: Uniquely identified records with a counter and an optional category
//! - **Store**: Keeps items sorted descending by counter and notifies subscribers
//! - **Snapshots**: Ordered sections of ordered items, built from the store
//! - **Diff**: Insert/delete/move/reload ops that turn one snapshot into another
//! - **Controller**: Applies each change to a list view, one script at a time
//!
//! ## Example
//!
//! ```ignore
//! use diffable::{ControllerConfig, IndexPath, ItemStore, ListController, Rendering, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(ItemStore::new(StoreConfig::icons()));
//! let mut list =
//!     ListController::sectioned(Arc::clone(&store), Rendering::new(), ControllerConfig::default())?;
//!
//! // Tap the third vehicle: it climbs to the top of its section.
//! list.tap(IndexPath::new(0, 2))?;
//!
//! // Swipe away the first weather row.
//! list.swipe_delete(IndexPath::new(1, 0))?;
//!
//! // A plain list keeps every row in one implicit section.
//! let fruits = Arc::new(ItemStore::new(StoreConfig::fruits()));
//! let mut rows = ListController::unsectioned(fruits, Rendering::new(), ControllerConfig::default())?;
//! rows.tap(IndexPath::new(0, 1))?;
//! ```

pub mod controller;
pub mod diff;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod subscriptions;
pub mod types;
pub mod view;

// Re-exports
pub use controller::{ControllerConfig, ListController, Mutation, Scheduler, SectionOf, TaskId};
pub use diff::{apply, diff, EditOp, EditStats};
pub use error::{DiffError, Result};
pub use snapshot::{
    item_category, main_section, SectionLayout, SectionSnapshot, Snapshot, SnapshotBuilder,
};
pub use store::{ItemStore, StoreConfig};
pub use subscriptions::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
    SubscriptionManager,
};
pub use types::*;
pub use view::{AppliedScript, ListView, Rendering};

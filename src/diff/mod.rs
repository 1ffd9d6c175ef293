//! Reconciliation between two sectioned snapshots.
//!
//! [`diff`] computes an ordered list of [`EditOp`]s that morphs a rendering
//! of one snapshot into a rendering of another; [`apply`] defines exactly
//! how those ops act on a rendering.
//!
//! Items are matched by identity only. An item present in both snapshots
//! is moved when its position changed and reloaded when its value changed;
//! a changed section key is a cross-section move, never a delete plus an
//! insert. Items that keep their relative order emit nothing.
//!
//! # Example
//!
//! ```ignore
//! let ops = diff(&rendered, &latest)?;
//! let next = apply(&rendered, &ops)?;
//! assert_eq!(next, latest);
//! ```

mod apply;
mod engine;
mod lis;
mod ops;

pub use apply::apply;
pub use engine::diff;
pub use ops::{EditOp, EditStats};

//! The presentation seam: something that renders a snapshot and accepts
//! edit scripts.

use crate::diff::{apply, EditOp, EditStats};
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::types::Identifiable;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A live list view.
///
/// `apply` must be atomic: either every op of the script takes effect or
/// none does.
pub trait ListView<S, T: Identifiable> {
    /// What the view currently shows.
    fn rendered(&self) -> &Snapshot<S, T>;

    /// Apply one edit script, optionally animated.
    fn apply(&mut self, ops: &[EditOp<S, T>], animated: bool) -> Result<()>;
}

/// In-memory view model for tests and demos. Keeps the rendered snapshot
/// and a log of the most recent scripts it accepted.
#[derive(Debug)]
pub struct Rendering<S, T: Identifiable> {
    current: Snapshot<S, T>,
    applied: VecDeque<AppliedScript>,
    history_limit: usize,
}

/// Record of one accepted script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedScript {
    pub stats: EditStats,
    pub animated: bool,
}

impl<S, T> Rendering<S, T>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone,
{
    /// Scripts remembered by [`Rendering::new`].
    pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

    pub fn new() -> Self {
        Self::with_history_limit(Self::DEFAULT_HISTORY_LIMIT)
    }

    /// Keep at most `limit` scripts in the history; older ones are discarded.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            current: Snapshot::new(),
            applied: VecDeque::new(),
            history_limit: limit,
        }
    }

    /// The most recently applied scripts, oldest first.
    pub fn history(&self) -> &[AppliedScript] {
        self.applied.as_slices().0
    }

    /// Replace the rendered content without an edit script, as a full
    /// reload would.
    pub fn reset(&mut self, snapshot: Snapshot<S, T>) {
        self.current = snapshot;
    }
}

impl<S, T> Default for Rendering<S, T>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> ListView<S, T> for Rendering<S, T>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone,
{
    fn rendered(&self) -> &Snapshot<S, T> {
        &self.current
    }

    fn apply(&mut self, ops: &[EditOp<S, T>], animated: bool) -> Result<()> {
        let next = apply(&self.current, ops)?;
        self.current = next;

        let stats = EditStats::from_ops(ops);
        debug!(%stats, animated, "rendering updated");
        self.applied.push_back(AppliedScript { stats, animated });
        while self.applied.len() > self.history_limit {
            self.applied.pop_front();
        }
        self.applied.make_contiguous();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::types::{Category, Item, ItemId};

    fn item(id: u64) -> Item {
        Item {
            id: ItemId(id),
            name: format!("item-{}", id),
            count: 0,
            category: Some(Category::Person),
        }
    }

    #[test]
    fn test_apply_records_history() {
        let mut view: Rendering<Category, Item> = Rendering::new();
        let target = Snapshot::from_sections(vec![(Category::Person, vec![item(1), item(2)])]);

        let ops = diff(view.rendered(), &target).unwrap();
        view.apply(&ops, false).unwrap();

        assert_eq!(view.rendered(), &target);
        assert_eq!(view.history().len(), 1);
        assert_eq!(view.history()[0].stats.inserted_items, 2);
        assert!(!view.history()[0].animated);
    }

    #[test]
    fn test_rejected_script_changes_nothing() {
        let mut view: Rendering<Category, Item> = Rendering::new();
        let target = Snapshot::from_sections(vec![(Category::Person, vec![item(1)])]);
        let ops = diff(&Snapshot::new(), &target).unwrap();
        view.apply(&ops, true).unwrap();

        // Same script again: the section already exists.
        assert!(view.apply(&ops, true).is_err());
        assert_eq!(view.rendered(), &target);
        assert_eq!(view.history().len(), 1);
    }

    #[test]
    fn test_history_is_capped() {
        let mut view: Rendering<Category, Item> = Rendering::with_history_limit(2);

        for n in 1..=3 {
            let target =
                Snapshot::from_sections(vec![(Category::Person, (1..=n).map(item).collect())]);
            let ops = diff(view.rendered(), &target).unwrap();
            view.apply(&ops, true).unwrap();
        }

        assert_eq!(view.history().len(), 2);
        assert_eq!(view.history()[0].stats.inserted_items, 1);
        assert_eq!(view.history()[1].stats.inserted_items, 1);
        assert_eq!(view.rendered().item_count(), 3);
    }
}

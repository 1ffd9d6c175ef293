//! Primitive edit operations produced by the reconciler.

use crate::types::{Identifiable, IndexPath};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One primitive edit.
///
/// Ops are sequential: each one addresses the rendering as left by the
/// ops before it, never the original `old` snapshot. Moves remove at
/// `from` first and then insert at `to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp<S, T: Identifiable> {
    DeleteItem {
        id: T::Id,
        at: IndexPath,
    },
    DeleteSection {
        section: S,
        index: usize,
    },
    InsertSection {
        section: S,
        index: usize,
    },
    MoveSection {
        section: S,
        from: usize,
        to: usize,
    },
    InsertItem {
        item: T,
        at: IndexPath,
    },
    MoveItem {
        id: T::Id,
        from: IndexPath,
        to: IndexPath,
    },
    /// Same identity, different value. `at` is the final position.
    ReloadItem {
        item: T,
        at: IndexPath,
    },
}

impl<S, T: Identifiable> EditOp<S, T> {
    pub fn is_delete(&self) -> bool {
        matches!(self, EditOp::DeleteItem { .. } | EditOp::DeleteSection { .. })
    }

    pub fn is_section_op(&self) -> bool {
        matches!(
            self,
            EditOp::DeleteSection { .. } | EditOp::InsertSection { .. } | EditOp::MoveSection { .. }
        )
    }

    /// Identity of the item this op touches, if it is an item op.
    pub fn item_id(&self) -> Option<T::Id> {
        match self {
            EditOp::DeleteItem { id, .. } | EditOp::MoveItem { id, .. } => Some(id.clone()),
            EditOp::InsertItem { item, .. } | EditOp::ReloadItem { item, .. } => Some(item.id()),
            _ => None,
        }
    }
}

/// Per-kind op counts for one edit script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditStats {
    pub deleted_items: usize,
    pub deleted_sections: usize,
    pub inserted_sections: usize,
    pub moved_sections: usize,
    pub inserted_items: usize,
    pub moved_items: usize,
    pub reloaded_items: usize,
}

impl EditStats {
    pub fn from_ops<S, T: Identifiable>(ops: &[EditOp<S, T>]) -> Self {
        let mut stats = Self::default();
        for op in ops {
            match op {
                EditOp::DeleteItem { .. } => stats.deleted_items += 1,
                EditOp::DeleteSection { .. } => stats.deleted_sections += 1,
                EditOp::InsertSection { .. } => stats.inserted_sections += 1,
                EditOp::MoveSection { .. } => stats.moved_sections += 1,
                EditOp::InsertItem { .. } => stats.inserted_items += 1,
                EditOp::MoveItem { .. } => stats.moved_items += 1,
                EditOp::ReloadItem { .. } => stats.reloaded_items += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.deleted_items
            + self.deleted_sections
            + self.inserted_sections
            + self.moved_sections
            + self.inserted_items
            + self.moved_items
            + self.reloaded_items
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for EditStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "-{} items, -{} sections, +{} sections, ~{} sections, +{} items, ~{} items, !{} items",
            self.deleted_items,
            self.deleted_sections,
            self.inserted_sections,
            self.moved_sections,
            self.inserted_items,
            self.moved_items,
            self.reloaded_items
        )
    }
}

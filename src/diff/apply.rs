//! Applying an edit script to a snapshot.

use super::ops::EditOp;
use crate::error::{DiffError, Result};
use crate::snapshot::{SectionSnapshot, Snapshot};
use crate::types::{Identifiable, IndexPath};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::trace;

/// Apply `ops` in order to a copy of `base`.
///
/// Every op is checked against the state it addresses; the first mismatch
/// aborts with [`DiffError::StaleApply`] and `base` is left untouched.
pub fn apply<S, T>(base: &Snapshot<S, T>, ops: &[EditOp<S, T>]) -> Result<Snapshot<S, T>>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone,
{
    let mut snapshot = base.clone();
    for (n, op) in ops.iter().enumerate() {
        apply_one(&mut snapshot, op).map_err(|reason| {
            DiffError::StaleApply(format!("op {} of {}: {}", n + 1, ops.len(), reason))
        })?;
    }
    trace!(ops = ops.len(), "applied edit script");
    Ok(snapshot)
}

fn apply_one<S, T>(snapshot: &mut Snapshot<S, T>, op: &EditOp<S, T>) -> std::result::Result<(), String>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone,
{
    match op {
        EditOp::DeleteItem { id, at } => {
            expect_item(snapshot, *at, id)?;
            snapshot.sections[at.section].items.remove(at.item);
        }
        EditOp::DeleteSection { section, index } => {
            expect_section(snapshot, *index, section)?;
            snapshot.sections.remove(*index);
        }
        EditOp::InsertSection { section, index } => {
            if *index > snapshot.sections.len() {
                return Err(format!(
                    "section index {} out of bounds (len {})",
                    index,
                    snapshot.sections.len()
                ));
            }
            if snapshot.section_index(section).is_some() {
                return Err(format!("section {:?} already present", section));
            }
            snapshot
                .sections
                .insert(*index, SectionSnapshot::new(section.clone(), Vec::new()));
        }
        EditOp::MoveSection { section, from, to } => {
            expect_section(snapshot, *from, section)?;
            let moved = snapshot.sections.remove(*from);
            if *to > snapshot.sections.len() {
                return Err(format!(
                    "section index {} out of bounds (len {})",
                    to,
                    snapshot.sections.len()
                ));
            }
            snapshot.sections.insert(*to, moved);
        }
        EditOp::InsertItem { item, at } => {
            let id = item.id();
            if snapshot.index_path_of(&id).is_some() {
                return Err(format!("item {:?} already present", id));
            }
            expect_slot(snapshot, *at)?;
            snapshot.sections[at.section].items.insert(at.item, item.clone());
        }
        EditOp::MoveItem { id, from, to } => {
            expect_item(snapshot, *from, id)?;
            let moved = snapshot.sections[from.section].items.remove(from.item);
            expect_slot(snapshot, *to)?;
            snapshot.sections[to.section].items.insert(to.item, moved);
        }
        EditOp::ReloadItem { item, at } => {
            expect_item(snapshot, *at, &item.id())?;
            snapshot.sections[at.section].items[at.item] = item.clone();
        }
    }
    Ok(())
}

fn expect_item<S, T>(snapshot: &Snapshot<S, T>, at: IndexPath, id: &T::Id) -> std::result::Result<(), String>
where
    T: Identifiable,
{
    let found = snapshot
        .sections
        .get(at.section)
        .and_then(|section| section.items.get(at.item))
        .map(|item| item.id());
    match found {
        Some(found) if &found == id => Ok(()),
        Some(found) => Err(format!("expected {:?} at {:?}, found {:?}", id, at, found)),
        None => Err(format!("no item at {:?}", at)),
    }
}

fn expect_section<S, T>(snapshot: &Snapshot<S, T>, index: usize, id: &S) -> std::result::Result<(), String>
where
    S: Eq + Debug,
{
    match snapshot.sections.get(index) {
        Some(section) if &section.id == id => Ok(()),
        Some(section) => Err(format!(
            "expected section {:?} at {}, found {:?}",
            id, index, section.id
        )),
        None => Err(format!("no section at {}", index)),
    }
}

/// `at` must name an existing section and an insertion index within it.
fn expect_slot<S, T>(snapshot: &Snapshot<S, T>, at: IndexPath) -> std::result::Result<(), String> {
    match snapshot.sections.get(at.section) {
        Some(section) if at.item <= section.items.len() => Ok(()),
        Some(section) => Err(format!(
            "item index {} out of bounds in section {} (len {})",
            at.item,
            at.section,
            section.items.len()
        )),
        None => Err(format!("no section at {}", at.section)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Item, ItemId};

    fn item(id: u64) -> Item {
        Item {
            id: ItemId(id),
            name: format!("item-{}", id),
            count: 0,
            category: Some(Category::Vehicle),
        }
    }

    fn base() -> Snapshot<Category, Item> {
        Snapshot::from_sections(vec![
            (Category::Vehicle, vec![item(1), item(2)]),
            (Category::Weather, vec![item(3)]),
        ])
    }

    #[test]
    fn test_move_then_reload() {
        let mut reloaded = item(1);
        reloaded.count = 9;
        let ops = vec![
            EditOp::MoveItem {
                id: ItemId(1),
                from: IndexPath::new(0, 0),
                to: IndexPath::new(1, 1),
            },
            EditOp::ReloadItem {
                item: reloaded.clone(),
                at: IndexPath::new(1, 1),
            },
        ];

        let result = apply(&base(), &ops).unwrap();
        assert_eq!(result.item_ids(&Category::Vehicle), Some(vec![ItemId(2)]));
        assert_eq!(result.item_at(IndexPath::new(1, 1)), Some(&reloaded));
    }

    #[test]
    fn test_wrong_identity_is_stale() {
        let ops = vec![EditOp::DeleteItem {
            id: ItemId(2),
            at: IndexPath::new(0, 0),
        }];
        assert!(matches!(apply(&base(), &ops), Err(DiffError::StaleApply(_))));
    }

    #[test]
    fn test_out_of_bounds_is_stale() {
        let ops = vec![EditOp::InsertItem {
            item: item(4),
            at: IndexPath::new(1, 5),
        }];
        assert!(matches!(apply(&base(), &ops), Err(DiffError::StaleApply(_))));
    }

    #[test]
    fn test_duplicate_insert_is_stale() {
        let ops = vec![EditOp::InsertItem {
            item: item(3),
            at: IndexPath::new(0, 0),
        }];
        assert!(matches!(apply(&base(), &ops), Err(DiffError::StaleApply(_))));
    }

    #[test]
    fn test_delete_section_drops_its_items() {
        let ops = vec![EditOp::DeleteSection {
            section: Category::Vehicle,
            index: 0,
        }];
        let result = apply(&base(), &ops).unwrap();
        assert_eq!(result.section_ids(), vec![Category::Weather]);
        assert_eq!(result.item_count(), 1);
    }

    #[test]
    fn test_failure_leaves_base_untouched() {
        let snapshot = base();
        let ops = vec![
            EditOp::DeleteItem {
                id: ItemId(1),
                at: IndexPath::new(0, 0),
            },
            EditOp::DeleteItem {
                id: ItemId(1),
                at: IndexPath::new(0, 0),
            },
        ];
        assert!(apply(&snapshot, &ops).is_err());
        assert_eq!(snapshot, base());
    }
}

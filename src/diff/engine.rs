//! Snapshot-to-snapshot reconciliation.

use super::lis::stable_positions;
use super::ops::{EditOp, EditStats};
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::types::{Identifiable, IndexPath};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// A section of the working copy: the rendering as it stands while ops
/// are being emitted. Only identities are tracked.
struct WorkSection<S, I> {
    id: S,
    items: Vec<I>,
}

/// Where an item lives in the new snapshot.
struct Target<'a, T> {
    section: usize,
    index: usize,
    value: &'a T,
}

/// Compute the ordered edit script that turns a rendering of `old` into a
/// rendering of `new`.
///
/// Both snapshots are validated first; a duplicate section or item identity
/// is the only error. The emitted order is:
///
/// 1. item deletions (descending index within each section)
/// 2. deletions of vanished sections that hold no surviving items
/// 3. section inserts and moves
/// 4. item inserts and moves, section by section in `new` order
/// 5. deletions of vanished sections whose items all moved elsewhere
/// 6. reloads, addressed at final positions
pub fn diff<S, T>(old: &Snapshot<S, T>, new: &Snapshot<S, T>) -> Result<Vec<EditOp<S, T>>>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone + PartialEq,
{
    old.validate()?;
    new.validate()?;

    let new_sections: HashMap<&S, usize> = new
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| (&section.id, i))
        .collect();

    let mut targets: HashMap<T::Id, Target<'_, T>> = HashMap::with_capacity(new.item_count());
    for (path, item) in new.iter() {
        targets.insert(
            item.id(),
            Target {
                section: path.section,
                index: path.item,
                value: item,
            },
        );
    }

    let mut work: Vec<WorkSection<S, T::Id>> = old
        .sections
        .iter()
        .map(|section| WorkSection {
            id: section.id.clone(),
            items: section.items.iter().map(|item| item.id()).collect(),
        })
        .collect();

    let mut ops = Vec::new();

    // Items gone from `new` entirely. Membership is global, so an item that
    // only changed section is not deleted here.
    for (s, section) in work.iter_mut().enumerate() {
        for i in (0..section.items.len()).rev() {
            if !targets.contains_key(&section.items[i]) {
                let id = section.items.remove(i);
                ops.push(EditOp::DeleteItem {
                    id,
                    at: IndexPath::new(s, i),
                });
            }
        }
    }

    // Vanished sections. Those still holding survivors are removed once the
    // survivors have moved out.
    for s in (0..work.len()).rev() {
        if !new_sections.contains_key(&work[s].id) && work[s].items.is_empty() {
            let section = work.remove(s).id;
            ops.push(EditOp::DeleteSection { section, index: s });
        }
    }

    order_sections(&mut work, new, &new_sections, &mut ops);

    // After ordering, the sections of `new` appear in `new` order, possibly
    // interleaved with vanished sections awaiting removal.
    let slots: Vec<usize> = work
        .iter()
        .enumerate()
        .filter(|(_, section)| new_sections.contains_key(&section.id))
        .map(|(i, _)| i)
        .collect();

    for (t, target) in new.sections.iter().enumerate() {
        let slot = slots[t];

        let candidates: Vec<(T::Id, usize)> = work[slot]
            .items
            .iter()
            .filter_map(|id| {
                let at = &targets[id];
                (at.section == t).then(|| (id.clone(), at.index))
            })
            .collect();
        let order: Vec<usize> = candidates.iter().map(|(_, index)| *index).collect();
        let stable: HashSet<T::Id> = candidates
            .into_iter()
            .zip(stable_positions(&order))
            .filter(|(_, keep)| *keep)
            .map(|((id, _), _)| id)
            .collect();

        for (i, item) in target.items.iter().enumerate() {
            let id = item.id();
            if stable.contains(&id) {
                continue;
            }

            let from = locate(&work, &id);
            if let Some(from) = from {
                work[from.section].items.remove(from.item);
            }

            let to = match i {
                0 => 0,
                _ => {
                    let prev = target.items[i - 1].id();
                    work[slot]
                        .items
                        .iter()
                        .position(|existing| *existing == prev)
                        .map_or(0, |p| p + 1)
                }
            };
            work[slot].items.insert(to, id.clone());
            let to = IndexPath::new(slot, to);

            match from {
                Some(from) if from == to => {}
                Some(from) => ops.push(EditOp::MoveItem { id, from, to }),
                None => ops.push(EditOp::InsertItem {
                    item: item.clone(),
                    at: to,
                }),
            }
        }
    }

    for s in (0..work.len()).rev() {
        if !new_sections.contains_key(&work[s].id) {
            let section = work.remove(s).id;
            ops.push(EditOp::DeleteSection { section, index: s });
        }
    }

    for section in &old.sections {
        for item in &section.items {
            if let Some(target) = targets.get(&item.id()) {
                if target.value != item {
                    ops.push(EditOp::ReloadItem {
                        item: target.value.clone(),
                        at: IndexPath::new(target.section, target.index),
                    });
                }
            }
        }
    }

    debug!(
        old_items = old.item_count(),
        new_items = new.item_count(),
        stats = %EditStats::from_ops(&ops),
        "computed edit script"
    );

    Ok(ops)
}

/// Bring the sections that survive into `new` order and insert fresh ones.
fn order_sections<S, T>(
    work: &mut Vec<WorkSection<S, T::Id>>,
    new: &Snapshot<S, T>,
    new_sections: &HashMap<&S, usize>,
    ops: &mut Vec<EditOp<S, T>>,
) where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable,
{
    let common: Vec<(S, usize)> = work
        .iter()
        .filter_map(|section| {
            new_sections
                .get(&section.id)
                .map(|&index| (section.id.clone(), index))
        })
        .collect();
    let order: Vec<usize> = common.iter().map(|(_, index)| *index).collect();
    let stable: HashSet<S> = common
        .into_iter()
        .zip(stable_positions(&order))
        .filter(|(_, keep)| *keep)
        .map(|((id, _), _)| id)
        .collect();

    for (t, target) in new.sections.iter().enumerate() {
        if stable.contains(&target.id) {
            continue;
        }

        let from = work.iter().position(|section| section.id == target.id);
        let moved = from.map(|from| work.remove(from));

        let to = match t {
            0 => 0,
            _ => {
                let prev = &new.sections[t - 1].id;
                work.iter()
                    .position(|section| &section.id == prev)
                    .map_or(0, |p| p + 1)
            }
        };

        match (from, moved) {
            (Some(from), Some(section)) => {
                work.insert(to, section);
                if from != to {
                    ops.push(EditOp::MoveSection {
                        section: target.id.clone(),
                        from,
                        to,
                    });
                }
            }
            _ => {
                work.insert(
                    to,
                    WorkSection {
                        id: target.id.clone(),
                        items: Vec::new(),
                    },
                );
                ops.push(EditOp::InsertSection {
                    section: target.id.clone(),
                    index: to,
                });
            }
        }
    }
}

fn locate<S, I: PartialEq>(work: &[WorkSection<S, I>], id: &I) -> Option<IndexPath> {
    work.iter().enumerate().find_map(|(s, section)| {
        section
            .items
            .iter()
            .position(|existing| existing == id)
            .map(|i| IndexPath::new(s, i))
    })
}

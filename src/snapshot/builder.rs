//! Grouping an ordered collection into a sectioned snapshot.

use super::{SectionSnapshot, Snapshot};
use crate::types::{Category, Identifiable, Item, Section};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{trace, warn};

/// Which sections a snapshot contains, and in what order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionLayout<S> {
    /// A fixed, finite set of keys. Every key appears, in this order,
    /// even when it holds no items.
    Fixed(Vec<S>),

    /// Sections exist only while they hold at least one item, ordered by
    /// the first item that mentions them.
    Emergent,
}

/// Converts the store's ordered collection into a [`Snapshot`].
#[derive(Clone, Debug)]
pub struct SnapshotBuilder<S> {
    layout: SectionLayout<S>,
}

impl<S> SnapshotBuilder<S>
where
    S: Clone + Eq + Hash + Debug,
{
    pub fn new(layout: SectionLayout<S>) -> Self {
        Self { layout }
    }

    pub fn fixed(keys: impl IntoIterator<Item = S>) -> Self {
        Self::new(SectionLayout::Fixed(keys.into_iter().collect()))
    }

    pub fn emergent() -> Self {
        Self::new(SectionLayout::Emergent)
    }

    pub fn layout(&self) -> &SectionLayout<S> {
        &self.layout
    }

    /// Group `items` by `section_of`, keeping their relative order.
    ///
    /// Items for which `section_of` returns `None` are left out.
    pub fn build<T, F>(&self, items: &[T], section_of: F) -> Snapshot<S, T>
    where
        T: Identifiable + Clone,
        F: Fn(&T) -> Option<S>,
    {
        let mut sections: Vec<SectionSnapshot<S, T>> = match &self.layout {
            SectionLayout::Fixed(keys) => keys
                .iter()
                .map(|key| SectionSnapshot::new(key.clone(), Vec::new()))
                .collect(),
            SectionLayout::Emergent => Vec::new(),
        };
        let mut slots: HashMap<S, usize> = sections
            .iter()
            .enumerate()
            .map(|(i, section)| (section.id.clone(), i))
            .collect();

        for item in items {
            let Some(key) = section_of(item) else {
                trace!(item = ?item.id(), "item has no section, skipped");
                continue;
            };
            let slot = match slots.get(&key).copied() {
                Some(slot) => slot,
                None => match self.layout {
                    SectionLayout::Fixed(_) => {
                        warn!(section = ?key, item = ?item.id(), "unknown section key, skipped");
                        continue;
                    }
                    SectionLayout::Emergent => {
                        sections.push(SectionSnapshot::new(key.clone(), Vec::new()));
                        slots.insert(key, sections.len() - 1);
                        sections.len() - 1
                    }
                },
            };
            sections[slot].items.push(item.clone());
        }

        trace!(sections = sections.len(), items = items.len(), "built snapshot");
        Snapshot { sections }
    }
}

impl SnapshotBuilder<Category> {
    /// One section per category, in enumeration order.
    pub fn by_category() -> Self {
        Self::fixed(Category::ALL)
    }

    /// Build a snapshot of store items keyed by their category.
    pub fn build_items(&self, items: &[Item]) -> Snapshot<Category, Item> {
        self.build(items, item_category)
    }
}

impl SnapshotBuilder<Section> {
    /// A single implicit section holding every item.
    pub fn single() -> Self {
        Self::fixed([Section::Main])
    }

    /// Build a snapshot with every store item in [`Section::Main`].
    pub fn build_rows(&self, items: &[Item]) -> Snapshot<Section, Item> {
        self.build(items, main_section)
    }
}

/// Section key of a categorized item.
pub fn item_category(item: &Item) -> Option<Category> {
    item.category
}

/// Section key of a row in an unsectioned list.
pub fn main_section(_: &Item) -> Option<Section> {
    Some(Section::Main)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    fn item(id: u64, name: &str, category: Category) -> Item {
        Item {
            id: ItemId(id),
            name: name.to_string(),
            count: 0,
            category: Some(category),
        }
    }

    fn row(id: u64, name: &str) -> Item {
        Item {
            id: ItemId(id),
            name: name.to_string(),
            count: 0,
            category: None,
        }
    }

    #[test]
    fn test_fixed_layout_includes_empty_sections() {
        let items = vec![
            item(1, "eyes", Category::Person),
            item(2, "car", Category::Vehicle),
            item(3, "bus", Category::Vehicle),
        ];

        let snapshot = SnapshotBuilder::by_category().build_items(&items);

        assert_eq!(snapshot.section_ids(), Category::ALL.to_vec());
        assert_eq!(
            snapshot.item_ids(&Category::Vehicle),
            Some(vec![ItemId(2), ItemId(3)])
        );
        assert_eq!(snapshot.item_ids(&Category::Weather), Some(vec![]));
        assert_eq!(snapshot.item_ids(&Category::Person), Some(vec![ItemId(1)]));
    }

    #[test]
    fn test_emergent_layout_orders_by_first_appearance() {
        let items = vec![
            item(1, "eyes", Category::Person),
            item(2, "car", Category::Vehicle),
            item(3, "person", Category::Person),
        ];

        let snapshot = SnapshotBuilder::emergent().build_items(&items);

        assert_eq!(snapshot.section_ids(), vec![Category::Person, Category::Vehicle]);
        assert_eq!(
            snapshot.item_ids(&Category::Person),
            Some(vec![ItemId(1), ItemId(3)])
        );
    }

    #[test]
    fn test_fixed_layout_skips_unknown_keys() {
        let items = vec![
            item(1, "car", Category::Vehicle),
            item(2, "moon", Category::Weather),
        ];

        let snapshot = SnapshotBuilder::fixed([Category::Vehicle]).build_items(&items);

        assert_eq!(snapshot.section_count(), 1);
        assert_eq!(snapshot.item_count(), 1);
    }

    #[test]
    fn test_single_implicit_section() {
        let items = vec![row(1, "apple"), row(2, "banana")];

        let snapshot = SnapshotBuilder::single().build_rows(&items);

        assert_eq!(snapshot.section_ids(), vec![Section::Main]);
        assert_eq!(
            snapshot.item_ids(&Section::Main),
            Some(vec![ItemId(1), ItemId(2)])
        );
    }

    #[test]
    fn test_single_section_is_kept_when_empty() {
        let snapshot = SnapshotBuilder::single().build_rows(&[]);
        assert_eq!(snapshot.section_count(), 1);
        assert_eq!(snapshot.item_count(), 0);
    }

    #[test]
    fn test_uncategorized_items_are_not_sectioned() {
        let items = vec![row(1, "apple"), item(2, "car", Category::Vehicle)];

        let snapshot = SnapshotBuilder::by_category().build_items(&items);

        assert_eq!(snapshot.item_count(), 1);
        assert_eq!(snapshot.item_ids(&Category::Vehicle), Some(vec![ItemId(2)]));
    }
}

//! Sectioned snapshots of the list as it should appear.
//!
//! A snapshot is an immutable, fully materialized value: an ordered list of
//! sections, each holding an ordered list of items. Two snapshots are the
//! reconciler's only inputs.

mod builder;

pub use builder::{item_category, main_section, SectionLayout, SnapshotBuilder};

use crate::error::{DiffError, Result};
use crate::types::{Identifiable, IndexPath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// One section of a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSnapshot<S, T> {
    pub id: S,
    pub items: Vec<T>,
}

impl<S, T> SectionSnapshot<S, T> {
    pub fn new(id: S, items: Vec<T>) -> Self {
        Self { id, items }
    }
}

/// Ordered sections of ordered items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<S, T> {
    pub sections: Vec<SectionSnapshot<S, T>>,
}

impl<S, T> Default for Snapshot<S, T> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

impl<S, T> Snapshot<S, T>
where
    S: Clone + Eq + Hash + Debug,
    T: Identifiable + Clone,
{
    /// An empty snapshot (no sections).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(section, items)` pairs, in order.
    pub fn from_sections(sections: impl IntoIterator<Item = (S, Vec<T>)>) -> Self {
        Self {
            sections: sections
                .into_iter()
                .map(|(id, items)| SectionSnapshot::new(id, items))
                .collect(),
        }
    }

    /// Append a section at the end.
    pub fn push_section(&mut self, id: S, items: Vec<T>) {
        self.sections.push(SectionSnapshot::new(id, items));
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Section identities in order.
    pub fn section_ids(&self) -> Vec<S> {
        self.sections.iter().map(|s| s.id.clone()).collect()
    }

    /// Item identities of one section, in order.
    pub fn item_ids(&self, section: &S) -> Option<Vec<T::Id>> {
        self.sections
            .iter()
            .find(|s| &s.id == section)
            .map(|s| s.items.iter().map(|item| item.id()).collect())
    }

    /// Index of a section by identity.
    pub fn section_index(&self, section: &S) -> Option<usize> {
        self.sections.iter().position(|s| &s.id == section)
    }

    /// Item at a position.
    pub fn item_at(&self, path: IndexPath) -> Option<&T> {
        self.sections.get(path.section)?.items.get(path.item)
    }

    /// Position of an item by identity.
    pub fn index_path_of(&self, id: &T::Id) -> Option<IndexPath> {
        self.sections.iter().enumerate().find_map(|(s, section)| {
            section
                .items
                .iter()
                .position(|item| &item.id() == id)
                .map(|i| IndexPath::new(s, i))
        })
    }

    /// Iterate over every item with its position.
    pub fn iter(&self) -> impl Iterator<Item = (IndexPath, &T)> + '_ {
        self.sections.iter().enumerate().flat_map(|(s, section)| {
            section
                .items
                .iter()
                .enumerate()
                .map(move |(i, item)| (IndexPath::new(s, i), item))
        })
    }

    /// Check that every section identity and every item identity appears at
    /// most once.
    pub fn validate(&self) -> Result<()> {
        let mut sections = HashSet::with_capacity(self.sections.len());
        let mut items = HashSet::with_capacity(self.item_count());

        for section in &self.sections {
            if !sections.insert(&section.id) {
                return Err(DiffError::DuplicateSection(format!("{:?}", section.id)));
            }
            for item in &section.items {
                let id = item.id();
                if !items.insert(id.clone()) {
                    return Err(DiffError::DuplicateItem(format!("{:?}", id)));
                }
            }
        }

        Ok(())
    }
}

//! Core types for the item store and reconciler.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Unique identifier for an item.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that carries a stable identity across snapshots.
///
/// Identity is the only key used to match values between two snapshots.
/// Full-value equality (`PartialEq`) decides whether a matched value needs
/// a reload.
pub trait Identifiable {
    type Id: Clone + Eq + Hash + fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Fixed set of item categories, used as section keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Vehicle,
    Weather,
    Person,
}

impl Category {
    /// All categories in enumeration order.
    pub const ALL: [Category; 3] = [Category::Vehicle, Category::Weather, Category::Person];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vehicle => "Vehicle",
            Category::Weather => "Weather",
            Category::Person => "Person",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section key of an unsectioned list: everything lives in one implicit section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    Main,
}

/// A single record in the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (assigned by store).
    pub id: ItemId,

    /// Display name.
    pub name: String,

    /// Counter bumped by taps. The store sorts descending on this.
    pub count: u64,

    /// Section key. Rows of an unsectioned list carry none.
    #[serde(default)]
    pub category: Option<Category>,
}

impl Identifiable for Item {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Input for creating a new item (before id assigned).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub count: u64,
}

impl ItemInput {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category: Some(category),
            count: 0,
        }
    }

    /// An uncategorized row.
    pub fn row(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            count: 0,
        }
    }

    /// Start the counter at a given value.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }
}

/// Position of an item inside a sectioned list.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Debug for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order() {
        let mut shuffled = vec![Category::Person, Category::Vehicle, Category::Weather];
        shuffled.sort();
        assert_eq!(shuffled, Category::ALL.to_vec());
    }

    #[test]
    fn test_item_input_deserialize_defaults_count() {
        let input: ItemInput =
            serde_json::from_str(r#"{"name": "car", "category": "Vehicle"}"#).unwrap();
        assert_eq!(input.name, "car");
        assert_eq!(input.category, Some(Category::Vehicle));
        assert_eq!(input.count, 0);

        let row: ItemInput = serde_json::from_str(r#"{"name": "apple"}"#).unwrap();
        assert_eq!(row.category, None);
    }

    #[test]
    fn test_identity_ignores_attributes() {
        let a = Item {
            id: ItemId(7),
            name: "bus".into(),
            count: 0,
            category: Some(Category::Vehicle),
        };
        let mut b = a.clone();
        b.count = 3;
        assert_eq!(a.id(), b.id());
        assert_ne!(a, b);
    }
}

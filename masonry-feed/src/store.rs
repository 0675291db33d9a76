//! Insertion-ordered, id-keyed item storage.
//!
//! Placement in the masonry grid depends on arrival order, so the store keeps
//! entries in a `Vec` and resolves ids through a side index. Overwriting an id
//! replaces the value in place and never moves it.

use rustc_hash::FxHashMap;

use crate::item::{Item, ItemId};

/// Counts reported by [`ItemStore::merge`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    /// Ids seen for the first time.
    pub inserted: usize,
    /// Ids that already existed and were overwritten.
    pub replaced: usize,
}

/// Ordered collection of items accumulated across pages.
#[derive(Debug, Clone)]
pub struct ItemStore<P> {
    entries: Vec<Item<P>>,
    index: FxHashMap<ItemId, usize>,
    revision: u64,
}

impl<P> Default for ItemStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ItemStore<P> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
            revision: 0,
        }
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an item by id.
    pub fn get(&self, id: ItemId) -> Option<&Item<P>> {
        self.index.get(&id).map(|&slot| &self.entries[slot])
    }

    /// Whether an item with `id` is stored.
    pub fn contains(&self, id: ItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item<P>> {
        self.entries.iter()
    }

    /// Items in insertion order, as a slice.
    pub fn as_slice(&self) -> &[Item<P>] {
        &self.entries
    }

    /// Monotonic counter bumped on every mutation.
    ///
    /// Two reads returning the same revision observed identical contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Inserts or overwrites one item. Returns `true` if the id was new.
    pub fn insert(&mut self, item: Item<P>) -> bool {
        self.revision = self.revision.wrapping_add(1);
        match self.index.get(&item.id) {
            Some(&slot) => {
                self.entries[slot] = item;
                false
            }
            None => {
                self.index.insert(item.id, self.entries.len());
                self.entries.push(item);
                true
            }
        }
    }

    /// Merges a page of items, keeping first-seen positions for known ids.
    pub fn merge(&mut self, items: impl IntoIterator<Item = Item<P>>) -> MergeStats {
        let mut stats = MergeStats::default();
        for item in items {
            if self.insert(item) {
                stats.inserted += 1;
            } else {
                stats.replaced += 1;
            }
        }
        stats
    }

    /// Drops every item.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
        self.revision = self.revision.wrapping_add(1);
    }
}

impl<'a, P> IntoIterator for &'a ItemStore<P> {
    type Item = &'a Item<P>;
    type IntoIter = std::slice::Iter<'a, Item<P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

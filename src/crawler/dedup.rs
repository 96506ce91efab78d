//! Deduplication store for discovered items
//!
//! Keyed by the derived item id, preserving insertion order. The store backs
//! both duplicate suppression and the no-new-items termination check.

use crate::model::ItemReference;
use std::collections::HashMap;

/// An id-keyed, insertion-ordered set of item references
///
/// Lifetime is one crawl run; there is no removal.
#[derive(Debug, Default)]
pub struct DedupStore {
    index: HashMap<String, usize>,
    items: Vec<ItemReference>,
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an item, reporting whether it was new
    ///
    /// Idempotent by id: re-inserting an existing id leaves the stored
    /// record unchanged and returns false, regardless of title or URL
    /// formatting differences on the duplicate.
    pub fn insert(&mut self, item: ItemReference) -> bool {
        if self.index.contains_key(&item.id) {
            return false;
        }

        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stored items in insertion order
    pub fn values(&self) -> &[ItemReference] {
        &self.items
    }

    /// Consumes the store, yielding items in insertion order
    pub fn into_values(self) -> Vec<ItemReference> {
        self.items
    }
}

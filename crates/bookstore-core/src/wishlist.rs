//! # Wishlist
//!
//! An ordered set of book ids with toggle semantics.
//!
//! One canonical model: ids only, resolved against the live catalog on
//! display, scoped per user by the store layer. Storing book snapshots
//! would go stale the moment an admin edits the catalog.

use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free list of book ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    ids: Vec<String>,
}

impl Wishlist {
    /// Creates an empty wishlist.
    pub fn new() -> Self {
        Wishlist::default()
    }

    /// Rebuilds a wishlist from persisted ids, dropping duplicates while
    /// keeping first-occurrence order.
    pub fn from_ids(ids: Vec<String>) -> Self {
        let mut wishlist = Wishlist::new();
        for id in ids {
            wishlist.add(&id);
        }
        wishlist
    }

    /// Adds a book id. Idempotent: adding a present id changes nothing.
    ///
    /// Returns `true` if the id was newly added.
    pub fn add(&mut self, book_id: &str) -> bool {
        if self.contains(book_id) {
            return false;
        }
        self.ids.push(book_id.to_string());
        true
    }

    /// Removes a book id. Returns `true` if it was present.
    pub fn remove(&mut self, book_id: &str) -> bool {
        let initial_len = self.ids.len();
        self.ids.retain(|id| id != book_id);
        self.ids.len() != initial_len
    }

    /// Adds the id if absent, removes it if present.
    ///
    /// Returns `true` if the id is present afterwards.
    pub fn toggle(&mut self, book_id: &str) -> bool {
        if self.remove(book_id) {
            false
        } else {
            self.ids.push(book_id.to_string());
            true
        }
    }

    /// Membership test.
    pub fn contains(&self, book_id: &str) -> bool {
        self.ids.iter().any(|id| id == book_id)
    }

    /// The ids in insertion order.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

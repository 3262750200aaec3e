//! # Cart Transitions
//!
//! The pure cart state and its transition functions.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Cart Transitions                             │
//! │                                                                 │
//! │  Intent                  Transition             State Change    │
//! │  ──────                  ──────────             ────────────    │
//! │                                                                 │
//! │  Add to cart ──────────► add_item() ──────────► merge-on-add    │
//! │                                                                 │
//! │  Change quantity ──────► update_quantity() ───► set exactly,    │
//! │                                                 <=0 deletes     │
//! │                                                                 │
//! │  Remove line ──────────► remove_item() ───────► retain others   │
//! │                                                                 │
//! │  Checkout / logout ────► clear() ─────────────► items empty     │
//! │                                                                 │
//! │  Totals never live here: they are derived on read against the   │
//! │  authoritative catalog prices via a resolver closure.           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::CartItem;
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `book_id` (adding the same book merges quantities)
/// - Quantity is >= 1 while a line exists (0 or below removes it)
/// - At most MAX_CART_ITEMS distinct lines
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart.
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rebuilds a cart around previously persisted lines.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Cart {
            items,
            created_at: Utc::now(),
        }
    }

    /// Adds a book to the cart or merges into the existing line.
    ///
    /// ## Behavior
    /// - Book already in cart: quantities are summed
    /// - Otherwise: a new line is appended
    ///
    /// No stock check happens here; the view layer gates over-ordering.
    pub fn add_item(&mut self, book_id: &str, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.book_id == book_id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::new(book_id, quantity));
        Ok(())
    }

    /// Sets a line's quantity exactly (not additive).
    ///
    /// ## Behavior
    /// - Quantity <= 0: removes the line
    /// - Book not in cart: error
    pub fn update_quantity(&mut self, book_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_item(book_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.book_id == book_id) {
            item.quantity = quantity;
            Ok(())
        } else {
            Err(CoreError::NotInCart(book_id.to_string()))
        }
    }

    /// Removes a line by book id.
    pub fn remove_item(&mut self, book_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.book_id != book_id);

        if self.items.len() == initial_len {
            Err(CoreError::NotInCart(book_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines (the badge count).
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Computes the subtotal against a price resolver.
    ///
    /// The resolver maps a book id to its current price in cents; the
    /// catalog store supplies it so totals always track the authoritative
    /// book price. A line whose book can no longer be resolved contributes
    /// zero (the resolver is expected to log the miss).
    pub fn subtotal_cents<F>(&self, price_of: F) -> i64
    where
        F: Fn(&str) -> Option<i64>,
    {
        self.items
            .iter()
            .map(|i| price_of(&i.book_id).unwrap_or(0) * i.quantity)
            .sum()
    }
}

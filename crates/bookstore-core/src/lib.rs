//! # bookstore-core: Pure Domain Logic for the Bookstore
//!
//! This crate is the **heart** of the bookstore. It contains the domain
//! model and every state transition as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Bookstore Architecture                       │
//! │                                                                 │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                   Host UI (any stack)                   │   │
//! │  │   Catalog ──► Cart ──► Checkout ──► Orders ──► Admin    │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │ subscribe / dispatch             │
//! │  ┌───────────────────────────▼─────────────────────────────┐   │
//! │  │              bookstore-store (stateful layer)           │   │
//! │  │   AuthStore · BookStore · CartStore · Notifier          │   │
//! │  └───────────────────────────┬─────────────────────────────┘   │
//! │                              │                                  │
//! │  ┌───────────────────────────▼─────────────────────────────┐   │
//! │  │             ★ bookstore-core (THIS CRATE) ★             │   │
//! │  │                                                         │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐   │   │
//! │  │   │  types  │ │  money  │ │  cart   │ │ validation │   │   │
//! │  │   │  Book   │ │  Money  │ │  Cart   │ │   rules    │   │   │
//! │  │   │  Order  │ │  cents  │ │Wishlist │ │   checks   │   │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────────┘   │   │
//! │  │                                                         │   │
//! │  │   NO I/O • NO PERSISTENCE • NO NETWORK • PURE FUNCTIONS │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Book, CartItem, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart transition functions (merge-on-add, delete-on-zero)
//! - [`wishlist`] - Ordered id set with toggle semantics
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every transition is deterministic
//! 2. **No I/O**: Persistence and timers are FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;
pub mod wishlist;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use wishlist::Wishlist;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps checkout snapshots a sane size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Stock level at or below which a book counts as "low stock" on the
/// admin dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

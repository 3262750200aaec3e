//! # Domain Types
//!
//! Core domain types used throughout the bookstore.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Types                             │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │    User      │   │    Book      │   │    Order     │        │
//! │  │  ──────────  │   │  ──────────  │   │  ──────────  │        │
//! │  │  id (UUID)   │   │  id (UUID)   │   │  id (UUID)   │        │
//! │  │  username    │   │  barcode     │   │  user_id     │        │
//! │  │  role        │   │  price_cents │   │  status      │        │
//! │  └──────────────┘   │  quantity    │   │  total_cents │        │
//! │                     └──────────────┘   └──────────────┘        │
//! │                                                                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐        │
//! │  │  CartItem    │   │ OrderStatus  │   │   SortKey    │        │
//! │  │  ──────────  │   │  ──────────  │   │  ──────────  │        │
//! │  │  book_id     │   │  Pending     │   │  Title       │        │
//! │  │  quantity    │   │  Processing  │   │  PriceLow    │        │
//! │  │  added_at    │   │  Shipped ... │   │  Rating ...  │        │
//! │  └──────────────┘   └──────────────┘   └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Books carry both an `id` (UUID v4, immutable, used for cart lines and
//! wishlist entries) and a `barcode` (human-readable business identifier,
//! potentially mutable).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Account role. Admin accounts see the back-office screens,
/// customers see the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Customer,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered account.
///
/// Passwords are plaintext mock data: there is no authentication backend,
/// only hard-coded demo accounts and locally registered ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name - business identifier.
    pub username: String,

    /// Plaintext mock password.
    pub password: String,

    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,

    /// Default shipping address.
    pub address: String,

    pub role: Role,
}

impl User {
    /// Display name shown in the account header.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }

    /// Checks whether this account may use the back-office screens.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Book
// =============================================================================

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, ISBN, etc.) - business identifier, unique.
    pub barcode: String,

    pub title: String,
    pub author: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level.
    pub quantity: i64,

    /// Category name (open set).
    pub category: String,

    pub description: String,

    /// Cover image URL.
    pub image_url: String,

    /// Average rating, 0.0-5.0. Unrated books have none and sort as 0.
    pub rating: Option<f64>,

    /// Review count.
    pub reviews: Option<i64>,
}

impl Book {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether any stock is available.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Case-insensitive substring match over title, author and barcode.
    ///
    /// An empty query matches every book.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        self.title.to_lowercase().contains(&query)
            || self.author.to_lowercase().contains(&query)
            || self.barcode.to_lowercase().contains(&query)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One cart line: a (book, quantity) pair.
///
/// ## Invariants
/// - At most one line per book id (adding the same book merges quantities)
/// - `quantity` is >= 1 while the line exists; setting it to 0 or below
///   removes the line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Synthetic line id (UUID v4).
    pub id: String,

    /// Book this line refers to. Prices are resolved against the live
    /// catalog, not frozen here.
    pub book_id: String,

    /// Quantity in cart.
    pub quantity: i64,

    /// When this line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Creates a new cart line for a book.
    pub fn new(book_id: impl Into<String>, quantity: i64) -> Self {
        CartItem {
            id: Uuid::new_v4().to_string(),
            book_id: book_id.into(),
            quantity,
            added_at: Utc::now(),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Just placed, not yet picked up by the back office.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Arrived. Terminal.
    Delivered,
    /// Cancelled before delivery. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Checks whether the status may move to `next`.
    ///
    /// Fulfillment only moves forward; cancellation is allowed from any
    /// non-terminal state. Delivered and cancelled orders never change.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        match (*self, next) {
            (Pending, Processing) | (Processing, Shipped) | (Shipped, Delivered) => true,
            (Pending, Cancelled) | (Processing, Cancelled) | (Shipped, Cancelled) => true,
            _ => false,
        }
    }

    /// Terminal states accept no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
/// Uses the snapshot pattern: `items` is a copy of the cart lines at
/// checkout time, immune to later cart mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,

    /// Cart lines frozen at checkout time.
    pub items: Vec<CartItem>,

    /// Grand total in cents, computed from the catalog prices at checkout.
    pub total_cents: i64,

    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub shipping_address: String,

    /// Payment method label ("card", "cod", ...). Open set, mock only.
    pub payment_method: String,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Catalog View Parameters
// =============================================================================

/// Sort order for the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Lexicographic ascending on title.
    Title,
    /// Lexicographic ascending on author.
    Author,
    /// Numeric ascending on price.
    PriceLow,
    /// Numeric descending on price.
    PriceHigh,
    /// Descending on rating; missing rating sorts as 0.
    Rating,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Title
    }
}

/// One entry of the category sidebar: a category name and how many books
/// carry it. The "all" pseudo-category counts the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_book() -> Book {
        Book {
            id: "b-1".to_string(),
            barcode: "9780000000001".to_string(),
            title: "Go in Action".to_string(),
            author: "William Kennedy".to_string(),
            price_cents: 3999,
            quantity: 3,
            category: "Programming".to_string(),
            description: String::new(),
            image_url: String::new(),
            rating: Some(4.5),
            reviews: Some(12),
        }
    }

    #[test]
    fn test_matches_query_case_insensitive() {
        let book = test_book();
        assert!(book.matches_query("go"));
        assert!(book.matches_query("KENNEDY"));
        assert!(book.matches_query("9780000000001"));
        assert!(book.matches_query(""));
        assert!(!book.matches_query("1984"));
    }

    #[test]
    fn test_status_transitions_forward() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(!Pending.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Processing));
    }

    #[test]
    fn test_status_terminal_states() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Processing.is_terminal());
    }

    #[test]
    fn test_cart_item_serde_layout() {
        // Persisted slices use camelCase keys for storage-layout parity.
        let item = CartItem::new("b-1", 2);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"bookId\""));
        assert!(json.contains("\"addedAt\""));
    }

    #[test]
    fn test_user_helpers() {
        let user = User {
            id: "u-1".to_string(),
            username: "admin".to_string(),
            password: "admin123".to_string(),
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            role: Role::Admin,
        };
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert!(user.is_admin());
    }
}

//! # Cart Store
//!
//! The per-user slices: cart lines, wishlist ids, order history. Every
//! mutation writes its slice straight back to storage under the current
//! user's keys, so a reload (or the next login) picks up exactly what
//! was left.
//!
//! ## Session Re-keying
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    CartStore × AuthEvent                        │
//! │                                                                 │
//! │  LoggedIn(user) ──► load cart/wishlist/orders from the user's   │
//! │                     keys (empty slices when nothing saved)      │
//! │                                                                 │
//! │  LoggedOut ───────► drop in-memory slices; the user's storage   │
//! │                     stays untouched for their next login        │
//! │                                                                 │
//! │  Mutations without a session fail NotLoggedIn.                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout
//! At most one order may be in flight: the placement path holds an async
//! lock across the simulated delay, and a second caller gets
//! `CheckoutInProgress` instead of queueing. The order append and the
//! cart clear are staged against storage before either lands in memory,
//! so a failed write leaves neither half behind.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use bookstore_core::{Cart, CartItem, Order, OrderStatus, User, Wishlist};

use crate::auth::AuthEvent;
use crate::books::BookStore;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::notify::Notifier;
use crate::storage::{cart_key, load_slice, orders_key, save_slice, wishlist_key, StorageBackend};

// =============================================================================
// Requests
// =============================================================================

/// Everything `create_order` needs beyond the cart itself.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,

    /// Order these lines instead of the cart (the buy-now path). The
    /// cart is left alone when this is set.
    pub items_override: Option<Vec<CartItem>>,

    /// Trust this total instead of recomputing from catalog prices.
    pub total_override: Option<i64>,
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    user: Option<User>,
    cart: Cart,
    wishlist: Wishlist,
    orders: Vec<Order>,
    last_error: Option<String>,
}

/// The per-user slice store.
///
/// ## Thread Safety
/// Slice state sits behind `Arc<Mutex<Inner>>`; the checkout in-flight
/// guard is a separate `tokio::sync::Mutex` so it can be held across
/// the simulated delay without blocking readers. `Clone` shares both.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Mutex<Inner>>,
    storage: Arc<dyn StorageBackend>,
    books: BookStore,
    notifier: Notifier,
    checkout_guard: Arc<tokio::sync::Mutex<()>>,
    wishlist_delay: Duration,
    checkout_delay: Duration,
}

impl CartStore {
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        books: BookStore,
        notifier: Notifier,
        config: &StoreConfig,
    ) -> Self {
        CartStore {
            inner: Arc::new(Mutex::new(Inner::default())),
            storage,
            books,
            notifier,
            checkout_guard: Arc::new(tokio::sync::Mutex::new(())),
            wishlist_delay: config.wishlist_delay,
            checkout_delay: config.checkout_delay,
        }
    }

    /// Spawns a task that feeds session changes into this store.
    pub fn attach(&self, auth: &crate::auth::AuthStore) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let mut rx = auth.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = rx.recv().await {
                store.on_auth_event(&event);
            }
        })
    }

    /// Reacts to a session change by re-keying the slices.
    pub fn on_auth_event(&self, event: &AuthEvent) {
        match event {
            AuthEvent::LoggedIn(user) => {
                let cart_items: Vec<CartItem> = self.load_or_empty(&cart_key(&user.id));
                let wishlist_ids: Vec<String> = self.load_or_empty(&wishlist_key(&user.id));
                let orders: Vec<Order> = self.load_or_empty(&orders_key(&user.id));

                debug!(
                    user_id = %user.id,
                    cart_lines = cart_items.len(),
                    wishlist = wishlist_ids.len(),
                    orders = orders.len(),
                    "Slices loaded for session"
                );

                self.with_inner(|inner| {
                    inner.user = Some(user.clone());
                    inner.cart = Cart::from_items(cart_items);
                    inner.wishlist = Wishlist::from_ids(wishlist_ids);
                    inner.orders = orders;
                    inner.last_error = None;
                });
            }
            AuthEvent::LoggedOut => {
                debug!("Session ended, dropping in-memory slices");
                self.with_inner(|inner| *inner = Inner::default());
            }
            AuthEvent::ProfileUpdated(user) => {
                self.with_inner(|inner| {
                    if inner.user.as_ref().is_some_and(|u| u.id == user.id) {
                        inner.user = Some(user.clone());
                    }
                });
            }
        }
    }

    // -------------------------------------------------------------------------
    // Cart mutations
    // -------------------------------------------------------------------------

    /// Adds a book to the cart, merging into an existing line. No stock
    /// check happens here; the presentation gates the add button.
    pub fn add_to_cart(&self, book_id: &str, quantity: i64) -> StoreResult<()> {
        let result = (|| {
            let user_id = self.require_user()?;
            let items = self.with_inner(|inner| {
                inner.cart.add_item(book_id, quantity)?;
                Ok::<_, StoreError>(inner.cart.items.clone())
            })?;
            save_slice(self.storage.as_ref(), &cart_key(&user_id), &items)?;
            debug!(book_id = %book_id, quantity, "Added to cart");
            Ok(())
        })();
        self.finish("add to cart", result)
    }

    /// Sets a line's quantity exactly; zero or less removes the line.
    pub fn update_cart_item(&self, book_id: &str, quantity: i64) -> StoreResult<()> {
        let result = (|| {
            let user_id = self.require_user()?;
            let items = self.with_inner(|inner| {
                inner.cart.update_quantity(book_id, quantity)?;
                Ok::<_, StoreError>(inner.cart.items.clone())
            })?;
            save_slice(self.storage.as_ref(), &cart_key(&user_id), &items)?;
            debug!(book_id = %book_id, quantity, "Cart line updated");
            Ok(())
        })();
        self.finish("update cart", result)
    }

    /// Removes a line regardless of its quantity.
    pub fn remove_from_cart(&self, book_id: &str) -> StoreResult<()> {
        let result = (|| {
            let user_id = self.require_user()?;
            let items = self.with_inner(|inner| {
                inner.cart.remove_item(book_id)?;
                Ok::<_, StoreError>(inner.cart.items.clone())
            })?;
            save_slice(self.storage.as_ref(), &cart_key(&user_id), &items)?;
            debug!(book_id = %book_id, "Removed from cart");
            Ok(())
        })();
        self.finish("remove from cart", result)
    }

    /// Empties the cart and persists the empty slice.
    pub fn clear_cart(&self) -> StoreResult<()> {
        let result = (|| {
            let user_id = self.require_user()?;
            self.with_inner(|inner| inner.cart.clear());
            save_slice(
                self.storage.as_ref(),
                &cart_key(&user_id),
                &Vec::<CartItem>::new(),
            )?;
            debug!("Cart cleared");
            Ok(())
        })();
        self.finish("clear cart", result)
    }

    // -------------------------------------------------------------------------
    // Wishlist mutations
    // -------------------------------------------------------------------------

    /// Adds a book id to the wishlist (idempotent).
    pub async fn add_to_wishlist(&self, book_id: &str) -> StoreResult<()> {
        sleep(self.wishlist_delay).await;
        let result = (|| {
            let user_id = self.require_user()?;
            let (added, ids) = self.with_inner(|inner| {
                let added = inner.wishlist.add(book_id);
                (added, inner.wishlist.ids().to_vec())
            });
            save_slice(self.storage.as_ref(), &wishlist_key(&user_id), &ids)?;
            if added {
                self.notifier.success("Added to wishlist");
            }
            Ok(())
        })();
        self.finish("add to wishlist", result)
    }

    /// Removes a book id from the wishlist.
    pub async fn remove_from_wishlist(&self, book_id: &str) -> StoreResult<()> {
        sleep(self.wishlist_delay).await;
        let result = (|| {
            let user_id = self.require_user()?;
            let (removed, ids) = self.with_inner(|inner| {
                let removed = inner.wishlist.remove(book_id);
                (removed, inner.wishlist.ids().to_vec())
            });
            save_slice(self.storage.as_ref(), &wishlist_key(&user_id), &ids)?;
            if removed {
                self.notifier.info("Removed from wishlist");
            }
            Ok(())
        })();
        self.finish("remove from wishlist", result)
    }

    /// Flips a book's wishlist membership, returning the new state.
    pub async fn toggle_wishlist(&self, book_id: &str) -> StoreResult<bool> {
        sleep(self.wishlist_delay).await;
        let result = (|| {
            let user_id = self.require_user()?;
            let (now_in, ids) = self.with_inner(|inner| {
                let now_in = inner.wishlist.toggle(book_id);
                (now_in, inner.wishlist.ids().to_vec())
            });
            save_slice(self.storage.as_ref(), &wishlist_key(&user_id), &ids)?;
            if now_in {
                self.notifier.success("Added to wishlist");
            } else {
                self.notifier.info("Removed from wishlist");
            }
            Ok(now_in)
        })();
        self.finish("toggle wishlist", result)
    }

    pub fn is_in_wishlist(&self, book_id: &str) -> bool {
        self.with_inner(|inner| inner.wishlist.contains(book_id))
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Places an order from the cart (or the override lines).
    ///
    /// ## Errors
    /// - `CheckoutInProgress` when another order is already in flight
    /// - `NotLoggedIn` without a session
    /// - `EmptyCart` when there is nothing to order
    pub async fn create_order(&self, request: CheckoutRequest) -> StoreResult<Order> {
        let guard = match self.checkout_guard.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                let err = StoreError::CheckoutInProgress;
                self.record_error(&err);
                return Err(err);
            }
        };

        let result = self.place_order(request).await;
        drop(guard);

        match &result {
            Ok(order) => self
                .notifier
                .success(format!("Order placed: {}", order.total())),
            Err(e) => {
                self.notifier.error(format!("Could not place order: {e}"));
                self.record_error(e);
            }
        }
        result
    }

    async fn place_order(&self, request: CheckoutRequest) -> StoreResult<Order> {
        let (user, items, from_cart) = self.with_inner(|inner| {
            let user = inner.user.clone();
            match request.items_override.clone() {
                Some(items) => (user, items, false),
                None => (user, inner.cart.items.clone(), true),
            }
        });
        let user = user.ok_or(StoreError::NotLoggedIn)?;

        if items.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        // Simulated payment round trip. The in-flight guard stays held.
        sleep(self.checkout_delay).await;

        let total_cents = match request.total_override {
            Some(total) => total,
            None => {
                let mut total = 0;
                for item in &items {
                    let unit = self.books.price_of(&item.book_id).unwrap_or(0);
                    total += unit * item.quantity;
                }
                total
            }
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            items: items.clone(),
            total_cents,
            status: OrderStatus::Pending,
            order_date: Utc::now(),
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
        };

        // Stage both slices against storage before touching memory. A
        // failed cart write rolls the orders slice back so storage never
        // holds the order alongside a still-full cart.
        let (staged_orders, prior_orders) = self.with_inner(|inner| {
            let prior = inner.orders.clone();
            let mut staged = prior.clone();
            staged.insert(0, order.clone());
            (staged, prior)
        });

        save_slice(self.storage.as_ref(), &orders_key(&user.id), &staged_orders)?;
        if from_cart {
            if let Err(e) = save_slice(
                self.storage.as_ref(),
                &cart_key(&user.id),
                &Vec::<CartItem>::new(),
            ) {
                warn!(error = %e, "Cart clear failed after order write, rolling order back");
                save_slice(self.storage.as_ref(), &orders_key(&user.id), &prior_orders)?;
                return Err(e);
            }
        }

        self.with_inner(|inner| {
            inner.orders = staged_orders;
            if from_cart {
                inner.cart.clear();
            }
            inner.last_error = None;
        });

        for item in &order.items {
            self.books.consume_stock(&item.book_id, item.quantity);
        }

        info!(
            order_id = %order.id,
            user_id = %user.id,
            lines = order.items.len(),
            total = %order.total(),
            "Order placed"
        );
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Derived reads
    // -------------------------------------------------------------------------

    /// Cart lines in insertion order.
    pub fn items(&self) -> Vec<CartItem> {
        self.with_inner(|inner| inner.cart.items.clone())
    }

    /// Total units across all lines (the cart badge).
    pub fn cart_item_count(&self) -> i64 {
        self.with_inner(|inner| inner.cart.total_quantity())
    }

    /// Cart subtotal against live catalog prices. A line whose book has
    /// left the catalog contributes zero.
    pub fn cart_total_cents(&self) -> i64 {
        let items = self.items();
        items
            .iter()
            .map(|item| self.books.price_of(&item.book_id).unwrap_or(0) * item.quantity)
            .sum()
    }

    pub fn wishlist_ids(&self) -> Vec<String> {
        self.with_inner(|inner| inner.wishlist.ids().to_vec())
    }

    /// Order history, newest first.
    pub fn orders(&self) -> Vec<Order> {
        self.with_inner(|inner| inner.orders.clone())
    }

    /// The last mutator failure, surfaced inline by the cart panel.
    pub fn last_error(&self) -> Option<String> {
        self.with_inner(|inner| inner.last_error.clone())
    }

    pub fn clear_error(&self) {
        self.with_inner(|inner| inner.last_error = None);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn require_user(&self) -> StoreResult<String> {
        self.with_inner(|inner| inner.user.as_ref().map(|u| u.id.clone()))
            .ok_or(StoreError::NotLoggedIn)
    }

    fn load_or_empty<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> T {
        match load_slice(self.storage.as_ref(), key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Slice load failed, starting empty");
                T::default()
            }
        }
    }

    fn finish<T>(&self, what: &str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(e) = &result {
            warn!(error = %e, "Failed to {what}");
            self.record_error(e);
        } else {
            self.with_inner(|inner| inner.last_error = None);
        }
        result
    }

    fn record_error(&self, err: &StoreError) {
        self.with_inner(|inner| inner.last_error = Some(err.to_string()));
    }

    fn with_inner<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Inner) -> R,
    {
        let mut inner = self.inner.lock().expect("Cart mutex poisoned");
        f(&mut inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{demo_accounts, sample_catalog};
    use crate::storage::MemoryStorage;

    fn john() -> User {
        demo_accounts().remove(1)
    }

    fn store() -> CartStore {
        CartStore::new(
            Arc::new(MemoryStorage::new()),
            BookStore::with_catalog(sample_catalog()),
            Notifier::default(),
            &StoreConfig::instant(),
        )
    }

    fn logged_in() -> CartStore {
        let cart = store();
        cart.on_auth_event(&AuthEvent::LoggedIn(john()));
        cart
    }

    #[test]
    fn test_mutations_without_session_fail() {
        let cart = store();
        assert!(matches!(
            cart.add_to_cart("b-1", 1).unwrap_err(),
            StoreError::NotLoggedIn
        ));
        assert!(cart.last_error().is_some());
    }

    #[test]
    fn test_add_merges_lines_and_persists() {
        let cart = logged_in();
        cart.add_to_cart("b-1", 1).unwrap();
        cart.add_to_cart("b-1", 2).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(cart.cart_item_count(), 3);

        // A fresh store against the same storage sees the saved slice.
        let reloaded = CartStore::new(
            cart.storage.clone(),
            cart.books.clone(),
            Notifier::default(),
            &StoreConfig::instant(),
        );
        reloaded.on_auth_event(&AuthEvent::LoggedIn(john()));
        assert_eq!(reloaded.cart_item_count(), 3);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let cart = logged_in();
        cart.add_to_cart("b-1", 2).unwrap();
        cart.update_cart_item("b-1", 0).unwrap();
        assert!(cart.items().is_empty());

        assert!(cart.update_cart_item("b-1", 1).is_err());
    }

    #[test]
    fn test_total_tracks_live_prices() {
        let cart = logged_in();
        cart.add_to_cart("b-3", 2).unwrap(); // 1984 @ $14.99
        assert_eq!(cart.cart_total_cents(), 2998);

        // A price change is reflected immediately.
        cart.books
            .update_book(
                "b-3",
                crate::books::BookPatch {
                    price_cents: Some(1000),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cart.cart_total_cents(), 2000);

        // A deleted book contributes zero rather than erroring.
        cart.books.delete_book("b-3").unwrap();
        assert_eq!(cart.cart_total_cents(), 0);
    }

    #[tokio::test]
    async fn test_wishlist_toggle_round_trip() {
        let cart = logged_in();

        assert!(cart.toggle_wishlist("b-5").await.unwrap());
        assert!(cart.is_in_wishlist("b-5"));
        assert!(!cart.toggle_wishlist("b-5").await.unwrap());
        assert!(!cart.is_in_wishlist("b-5"));

        cart.add_to_wishlist("b-5").await.unwrap();
        cart.add_to_wishlist("b-5").await.unwrap();
        assert_eq!(cart.wishlist_ids(), vec!["b-5".to_string()]);
    }

    #[tokio::test]
    async fn test_checkout_snapshots_clears_and_consumes_stock() {
        let cart = logged_in();
        cart.add_to_cart("b-3", 2).unwrap();

        let stock_before = cart.books.get_book("b-3").unwrap().quantity;
        let order = cart
            .create_order(CheckoutRequest {
                shipping_address: "42 Paperback Lane".to_string(),
                payment_method: "card".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 2998);
        assert_eq!(order.items.len(), 1);
        assert!(cart.items().is_empty());
        assert_eq!(cart.orders().len(), 1);
        assert_eq!(
            cart.books.get_book("b-3").unwrap().quantity,
            stock_before - 2
        );
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_fails() {
        let cart = logged_in();
        assert!(matches!(
            cart.create_order(CheckoutRequest::default()).await.unwrap_err(),
            StoreError::EmptyCart
        ));
    }

    #[tokio::test]
    async fn test_buy_now_override_leaves_cart_alone() {
        let cart = logged_in();
        cart.add_to_cart("b-1", 1).unwrap();

        let order = cart
            .create_order(CheckoutRequest {
                shipping_address: "x".to_string(),
                payment_method: "card".to_string(),
                items_override: Some(vec![CartItem::new("b-3", 1)]),
                total_override: None,
            })
            .await
            .unwrap();

        assert_eq!(order.items[0].book_id, "b-3");
        assert_eq!(cart.cart_item_count(), 1);
    }

    #[tokio::test]
    async fn test_logout_drops_memory_but_not_storage() {
        let cart = logged_in();
        cart.add_to_cart("b-1", 2).unwrap();

        cart.on_auth_event(&AuthEvent::LoggedOut);
        assert!(cart.items().is_empty());
        assert!(cart.add_to_cart("b-1", 1).is_err());

        cart.on_auth_event(&AuthEvent::LoggedIn(john()));
        assert_eq!(cart.cart_item_count(), 2);
    }

    #[tokio::test]
    async fn test_per_user_isolation() {
        let cart = logged_in();
        cart.add_to_cart("b-1", 5).unwrap();

        let mut accounts = demo_accounts();
        let admin = accounts.remove(0);
        cart.on_auth_event(&AuthEvent::LoggedOut);
        cart.on_auth_event(&AuthEvent::LoggedIn(admin));
        assert!(cart.items().is_empty());

        cart.on_auth_event(&AuthEvent::LoggedOut);
        cart.on_auth_event(&AuthEvent::LoggedIn(john()));
        assert_eq!(cart.cart_item_count(), 5);
    }
}

//! # Back Office
//!
//! Admin-side derivations: the dashboard reports computed from the
//! catalog and the order dataset, and the order desk that walks orders
//! through their status progression.
//!
//! The order desk is its own dataset, separate from any customer's
//! persisted history; the storefront and the back office were never one
//! ledger and keeping them apart preserves that.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bookstore_core::{Book, CoreError, Money, Order, OrderStatus, LOW_STOCK_THRESHOLD};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Reports
// =============================================================================

/// Stock-level summary for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    pub total_titles: usize,
    pub total_units: i64,
    pub low_stock_titles: usize,
    pub out_of_stock_titles: usize,
    pub inventory_value_cents: i64,
}

impl InventoryReport {
    pub fn from_books(books: &[Book]) -> Self {
        InventoryReport {
            total_titles: books.len(),
            total_units: books.iter().map(|b| b.quantity).sum(),
            low_stock_titles: books
                .iter()
                .filter(|b| b.quantity > 0 && b.quantity <= LOW_STOCK_THRESHOLD)
                .count(),
            out_of_stock_titles: books.iter().filter(|b| !b.in_stock()).count(),
            inventory_value_cents: books.iter().map(|b| b.price_cents * b.quantity).sum(),
        }
    }

    pub fn inventory_value(&self) -> Money {
        Money::from_cents(self.inventory_value_cents)
    }
}

/// Order-volume summary for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub total_orders: usize,
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    pub cancelled: usize,
    /// Revenue across non-cancelled orders.
    pub revenue_cents: i64,
}

impl SalesReport {
    pub fn from_orders(orders: &[Order]) -> Self {
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
        SalesReport {
            total_orders: orders.len(),
            pending: count(OrderStatus::Pending),
            processing: count(OrderStatus::Processing),
            shipped: count(OrderStatus::Shipped),
            delivered: count(OrderStatus::Delivered),
            cancelled: count(OrderStatus::Cancelled),
            revenue_cents: orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .map(|o| o.total_cents)
                .sum(),
        }
    }

    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

// =============================================================================
// Order Desk
// =============================================================================

/// The admin order dataset and its status workflow.
#[derive(Debug, Clone, Default)]
pub struct OrderDesk {
    orders: Arc<Mutex<Vec<Order>>>,
}

impl OrderDesk {
    pub fn new() -> Self {
        OrderDesk::default()
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        OrderDesk {
            orders: Arc::new(Mutex::new(orders)),
        }
    }

    /// Records an order with the desk (newest first).
    pub fn record(&self, order: Order) {
        self.with_orders_mut(|orders| orders.insert(0, order));
    }

    /// All orders, newest first.
    pub fn orders(&self) -> Vec<Order> {
        self.with_orders_mut(|orders| orders.clone())
    }

    pub fn get_order(&self, id: &str) -> Option<Order> {
        self.with_orders_mut(|orders| orders.iter().find(|o| o.id == id).cloned())
    }

    /// Orders currently in the given status.
    pub fn orders_with_status(&self, status: OrderStatus) -> Vec<Order> {
        self.with_orders_mut(|orders| {
            orders.iter().filter(|o| o.status == status).cloned().collect()
        })
    }

    /// Moves an order to the next status.
    ///
    /// ## Errors
    /// - `OrderNotFound` for an unknown id
    /// - `InvalidStatusTransition` for a backward move or a move out of
    ///   a terminal status
    pub fn update_status(&self, id: &str, next: OrderStatus) -> StoreResult<Order> {
        self.with_orders_mut(|orders| {
            let order = orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| StoreError::Core(CoreError::OrderNotFound(id.to_string())))?;

            if !order.status.can_transition_to(next) {
                warn!(order_id = %id, from = %order.status, to = %next, "Status transition rejected");
                return Err(StoreError::Core(CoreError::InvalidStatusTransition {
                    order_id: id.to_string(),
                    from: order.status.to_string(),
                    to: next.to_string(),
                }));
            }

            order.status = next;
            info!(order_id = %id, status = %next, "Order status updated");
            Ok(order.clone())
        })
    }

    /// Dashboard summary over the desk's orders.
    pub fn sales_report(&self) -> SalesReport {
        self.with_orders_mut(|orders| SalesReport::from_orders(orders))
    }

    fn with_orders_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<Order>) -> R,
    {
        let mut orders = self.orders.lock().expect("Order desk mutex poisoned");
        f(&mut orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

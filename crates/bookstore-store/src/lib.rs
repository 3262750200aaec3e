//! # Bookstore Store Layer
//!
//! The stateful half of the bookstore: session, catalog, per-user cart
//! and wishlist slices, persistence, notifications, and the back-office
//! derivations. Pure domain rules live in `bookstore-core`; this crate
//! owns the state, the storage, and the simulated network pacing.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Store Layer                              │
//! │                                                                 │
//! │  AuthStore ──AuthEvent──► CartStore ──► StorageBackend          │
//! │      │                        │          (memory | files)       │
//! │      │                        ├──► Notifier (broadcast)         │
//! │      │                        └──► BookStore::price_of          │
//! │      │                                                          │
//! │  BookStore ◄── admin CRUD / stock        OrderDesk (back office)│
//! │      └──► InventoryReport                    └──► SalesReport   │
//! │                                                                 │
//! │  Embedders (Tauri, egui, wasm) subscribe and render; nothing    │
//! │  here touches a UI.                                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod admin;
pub mod auth;
pub mod books;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;

pub use admin::{InventoryReport, OrderDesk, SalesReport};
pub use auth::{AuthEvent, AuthStore, NewUser, ProfileUpdate};
pub use books::{BookPatch, BookStore, NewBook};
pub use cart::{CartStore, CheckoutRequest};
pub use config::StoreConfig;
pub use error::{StorageError, StoreError, StoreResult};
pub use notify::{Notification, NotificationKind, Notifier};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};

/// Initializes tracing for embedders and examples.
///
/// Respects `RUST_LOG`; defaults to `info` for this crate's targets.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bookstore_store=info,bookstore_core=info"));

    // A second init (tests, embedder already set one up) is not an error
    // worth surfacing.
    let _ = fmt().with_env_filter(filter).try_init();
}

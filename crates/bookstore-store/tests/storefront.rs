//! End-to-end storefront flows against the assembled store layer.

use std::sync::Arc;
use std::time::Duration;

use bookstore_core::OrderStatus;
use bookstore_store::{
    AuthEvent, AuthStore, BookStore, CartStore, CheckoutRequest, FileStorage, InventoryReport,
    MemoryStorage, NewBook, Notifier, OrderDesk, StoreConfig, StoreError,
};

fn assemble(storage: Arc<dyn bookstore_store::StorageBackend>, config: StoreConfig) -> (AuthStore, BookStore, CartStore) {
    let auth = AuthStore::new(bookstore_store::catalog::demo_accounts(), &config);
    let books = BookStore::with_catalog(bookstore_store::catalog::sample_catalog());
    let cart = CartStore::new(
        storage,
        books.clone(),
        Notifier::new(config.notification_dismiss),
        &config,
    );
    (auth, books, cart)
}

#[tokio::test]
async fn test_login_browse_add_checkout() {
    let (auth, books, cart) = assemble(Arc::new(MemoryStorage::new()), StoreConfig::instant());
    cart.attach(&auth);

    let user = auth.login("john", "john123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(user));

    books.set_search_query("1984").unwrap();
    let hits = books.filtered_books();
    assert_eq!(hits.len(), 1);

    cart.add_to_cart(&hits[0].id, 2).unwrap();
    assert_eq!(cart.cart_total_cents(), 2 * hits[0].price_cents);

    let order = cart
        .create_order(CheckoutRequest {
            shipping_address: "42 Paperback Lane".to_string(),
            payment_method: "card".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(cart.items().is_empty());
    assert_eq!(cart.orders().len(), 1);
}

#[tokio::test]
async fn test_concurrent_checkout_places_one_order() {
    let mut config = StoreConfig::instant();
    config.checkout_delay = Duration::from_millis(50);

    let (auth, _books, cart) = assemble(Arc::new(MemoryStorage::new()), config);
    let user = auth.login("john", "john123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(user));
    cart.add_to_cart("b-1", 1).unwrap();

    let request = CheckoutRequest {
        shipping_address: "x".to_string(),
        payment_method: "card".to_string(),
        ..Default::default()
    };
    let (a, b) = tokio::join!(
        cart.create_order(request.clone()),
        cart.create_order(request.clone())
    );

    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!([a, b]
        .into_iter()
        .filter_map(|r| r.err())
        .any(|e| matches!(e, StoreError::CheckoutInProgress | StoreError::EmptyCart)));
    assert_eq!(cart.orders().len(), 1);
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::instant();

    {
        let storage = Arc::new(FileStorage::new(dir.path()).unwrap());
        let (auth, _books, cart) = assemble(storage, config.clone());
        let user = auth.login("john", "john123").await.unwrap();
        cart.on_auth_event(&AuthEvent::LoggedIn(user));

        cart.add_to_cart("b-5", 3).unwrap();
        cart.toggle_wishlist("b-8").await.unwrap();
    }

    // New process, same directory.
    let storage = Arc::new(FileStorage::new(dir.path()).unwrap());
    let (auth, _books, cart) = assemble(storage, config);
    let user = auth.login("john", "john123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(user));

    assert_eq!(cart.cart_item_count(), 3);
    assert_eq!(cart.wishlist_ids(), vec!["b-8".to_string()]);
}

#[tokio::test]
async fn test_users_never_see_each_other() {
    let (auth, _books, cart) = assemble(Arc::new(MemoryStorage::new()), StoreConfig::instant());

    let john = auth.login("john", "john123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(john.clone()));
    cart.add_to_cart("b-1", 4).unwrap();
    cart.toggle_wishlist("b-2").await.unwrap();

    auth.logout();
    cart.on_auth_event(&AuthEvent::LoggedOut);

    let admin = auth.login("admin", "admin123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(admin));
    assert!(cart.items().is_empty());
    assert!(cart.wishlist_ids().is_empty());
    cart.add_to_cart("b-3", 1).unwrap();

    cart.on_auth_event(&AuthEvent::LoggedOut);
    cart.on_auth_event(&AuthEvent::LoggedIn(john));
    assert_eq!(cart.cart_item_count(), 4);
    assert_eq!(cart.wishlist_ids(), vec!["b-2".to_string()]);
}

#[tokio::test]
async fn test_admin_restock_and_order_desk_flow() {
    let (auth, books, cart) = assemble(Arc::new(MemoryStorage::new()), StoreConfig::instant());
    let desk = OrderDesk::new();

    let admin = auth.login("admin", "admin123").await.unwrap();
    assert!(admin.is_admin());

    let added = books
        .add_book(NewBook {
            barcode: "978-0000000001".to_string(),
            title: "The Pragmatic Programmer".to_string(),
            author: "David Thomas".to_string(),
            price_cents: 4499,
            quantity: 2,
            category: "Programming".to_string(),
            description: String::new(),
            image_url: String::new(),
        })
        .unwrap();
    books.set_stock(&added.id, 10).unwrap();

    // A customer order lands on the desk for fulfilment.
    auth.logout();
    let john = auth.login("john", "john123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(john));
    cart.add_to_cart(&added.id, 1).unwrap();
    let order = cart
        .create_order(CheckoutRequest {
            shipping_address: "x".to_string(),
            payment_method: "cod".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    desk.record(order.clone());

    desk.update_status(&order.id, OrderStatus::Processing).unwrap();
    desk.update_status(&order.id, OrderStatus::Shipped).unwrap();
    desk.update_status(&order.id, OrderStatus::Delivered).unwrap();
    assert!(desk
        .update_status(&order.id, OrderStatus::Cancelled)
        .is_err());

    let report = desk.sales_report();
    assert_eq!(report.delivered, 1);
    assert_eq!(report.revenue_cents, 4499);

    let inventory = InventoryReport::from_books(&books.all_books());
    assert_eq!(inventory.total_titles, 9);
}

#[tokio::test]
async fn test_notifications_reach_subscribers() {
    let config = StoreConfig::instant();
    let notifier = Notifier::new(config.notification_dismiss);
    let books = BookStore::with_catalog(bookstore_store::catalog::sample_catalog());
    let cart = CartStore::new(
        Arc::new(MemoryStorage::new()),
        books,
        notifier.clone(),
        &config,
    );
    let auth = AuthStore::new(bookstore_store::catalog::demo_accounts(), &config);

    let mut rx = notifier.subscribe();
    let user = auth.login("john", "john123").await.unwrap();
    cart.on_auth_event(&AuthEvent::LoggedIn(user));

    cart.toggle_wishlist("b-4").await.unwrap();
    let n = rx.recv().await.unwrap();
    assert_eq!(n.message, "Added to wishlist");
    assert_eq!(n.kind, bookstore_store::NotificationKind::Success);
}

//! # Book Store
//!
//! The catalog: source-of-truth book list, the current view parameters
//! (search/category/sort), and the derived listings the storefront renders.
//!
//! ## Derivation Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   Catalog Derivations                           │
//! │                                                                 │
//! │  books ──┬──► filtered_books()   filter: query AND category     │
//! │          │                       sort: stable, per SortKey      │
//! │          │                                                      │
//! │          ├──► categories()       "all" + distinct categories    │
//! │          │                       with per-category counts       │
//! │          │                                                      │
//! │          └──► price_of(id)       resolver handed to CartStore   │
//! │                                  so totals track real prices    │
//! │                                                                 │
//! │  Derived values are recomputed on read, never stored.           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use uuid::Uuid;

use bookstore_core::validation::{
    validate_barcode, validate_price_cents, validate_required, validate_search_query,
    validate_stock,
};
use bookstore_core::{Book, CategoryCount, CoreError, SortKey, ValidationError};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Requests
// =============================================================================

/// Fields required to add a catalog entry.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub barcode: String,
    pub title: String,
    pub author: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub category: String,
    pub description: String,
    pub image_url: String,
}

/// Partial edit of a catalog entry. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub barcode: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<i64>,
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    books: Vec<Book>,
    search_query: String,
    /// `None` means the "all" pseudo-category.
    selected_category: Option<String>,
    sort_key: SortKey,
}

/// The catalog store.
///
/// ## Thread Safety
/// `Arc<Mutex<Inner>>`; the struct is `Clone` and all clones share the
/// same catalog, which is how CartStore gets its price resolver.
#[derive(Debug, Clone, Default)]
pub struct BookStore {
    inner: Arc<Mutex<Inner>>,
}

impl BookStore {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        BookStore::default()
    }

    /// Creates a catalog seeded with the given books.
    pub fn with_catalog(books: Vec<Book>) -> Self {
        let store = BookStore::new();
        store.with_inner(|inner| inner.books = books);
        store
    }

    // -------------------------------------------------------------------------
    // View parameters
    // -------------------------------------------------------------------------

    /// Sets the search query (trimmed, length-capped).
    pub fn set_search_query(&self, query: &str) -> StoreResult<()> {
        let query = validate_search_query(query)?;
        self.with_inner(|inner| inner.search_query = query);
        Ok(())
    }

    /// Selects a category filter; `None` shows every category.
    pub fn set_category(&self, category: Option<&str>) {
        self.with_inner(|inner| {
            inner.selected_category = category.map(|c| c.to_string());
        });
    }

    /// Sets the sort order of the listing.
    pub fn set_sort_key(&self, sort_key: SortKey) {
        self.with_inner(|inner| inner.sort_key = sort_key);
    }

    pub fn search_query(&self) -> String {
        self.with_inner(|inner| inner.search_query.clone())
    }

    pub fn selected_category(&self) -> Option<String> {
        self.with_inner(|inner| inner.selected_category.clone())
    }

    pub fn sort_key(&self) -> SortKey {
        self.with_inner(|inner| inner.sort_key)
    }

    // -------------------------------------------------------------------------
    // Derived listings
    // -------------------------------------------------------------------------

    /// The catalog filtered by query and category, sorted per the sort
    /// key. Recomputed on every call; ties keep their prior relative
    /// order (stable sort).
    pub fn filtered_books(&self) -> Vec<Book> {
        self.with_inner(|inner| {
            let mut books: Vec<Book> = inner
                .books
                .iter()
                .filter(|b| b.matches_query(&inner.search_query))
                .filter(|b| match &inner.selected_category {
                    Some(category) => &b.category == category,
                    None => true,
                })
                .cloned()
                .collect();

            match inner.sort_key {
                SortKey::Title => {
                    books.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                }
                SortKey::Author => {
                    books.sort_by(|a, b| a.author.to_lowercase().cmp(&b.author.to_lowercase()))
                }
                SortKey::PriceLow => books.sort_by(|a, b| a.price_cents.cmp(&b.price_cents)),
                SortKey::PriceHigh => books.sort_by(|a, b| b.price_cents.cmp(&a.price_cents)),
                SortKey::Rating => books.sort_by(|a, b| {
                    let ra = a.rating.unwrap_or(0.0);
                    let rb = b.rating.unwrap_or(0.0);
                    rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
                }),
            }

            books
        })
    }

    /// Category sidebar entries: "all" first with the total count, then
    /// each distinct category in first-appearance order with its count.
    pub fn categories(&self) -> Vec<CategoryCount> {
        self.with_inner(|inner| {
            let mut counts: Vec<CategoryCount> = vec![CategoryCount {
                name: "all".to_string(),
                count: inner.books.len(),
            }];

            for book in &inner.books {
                match counts.iter_mut().find(|c| c.name == book.category) {
                    Some(entry) => entry.count += 1,
                    None => counts.push(CategoryCount {
                        name: book.category.clone(),
                        count: 1,
                    }),
                }
            }

            counts
        })
    }

    /// Lookup by id; `None` renders as the not-found state.
    pub fn get_book(&self, id: &str) -> Option<Book> {
        self.with_inner(|inner| inner.books.iter().find(|b| b.id == id).cloned())
    }

    /// Current price resolver for the cart: book id → price in cents.
    /// A miss is logged here so totals silently counting zero still
    /// leave a trace.
    pub fn price_of(&self, id: &str) -> Option<i64> {
        let price = self.with_inner(|inner| {
            inner
                .books
                .iter()
                .find(|b| b.id == id)
                .map(|b| b.price_cents)
        });

        if price.is_none() {
            warn!(book_id = %id, "Price lookup missed: book no longer in catalog");
        }
        price
    }

    /// Snapshot of the whole catalog (admin listing).
    pub fn all_books(&self) -> Vec<Book> {
        self.with_inner(|inner| inner.books.clone())
    }

    // -------------------------------------------------------------------------
    // CRUD
    // -------------------------------------------------------------------------

    /// Adds a catalog entry.
    ///
    /// ## Errors
    /// - `ValidationError` for missing/negative required fields
    /// - `ValidationError::Duplicate` for a reused barcode
    pub fn add_book(&self, new_book: NewBook) -> StoreResult<Book> {
        validate_required("title", &new_book.title)?;
        validate_required("author", &new_book.author)?;
        validate_required("category", &new_book.category)?;
        validate_barcode(&new_book.barcode)?;
        validate_price_cents(new_book.price_cents)?;
        validate_stock(new_book.quantity)?;

        self.with_inner(|inner| {
            if inner.books.iter().any(|b| b.barcode == new_book.barcode) {
                return Err(ValidationError::Duplicate {
                    field: "barcode".to_string(),
                    value: new_book.barcode.clone(),
                }
                .into());
            }

            let book = Book {
                id: Uuid::new_v4().to_string(),
                barcode: new_book.barcode.clone(),
                title: new_book.title.clone(),
                author: new_book.author.clone(),
                price_cents: new_book.price_cents,
                quantity: new_book.quantity,
                category: new_book.category.clone(),
                description: new_book.description.clone(),
                image_url: new_book.image_url.clone(),
                rating: None,
                reviews: None,
            };

            info!(book_id = %book.id, barcode = %book.barcode, title = %book.title, "Book added");
            inner.books.push(book.clone());
            Ok(book)
        })
    }

    /// Applies a partial edit to a catalog entry.
    pub fn update_book(&self, id: &str, patch: BookPatch) -> StoreResult<Book> {
        if let Some(title) = &patch.title {
            validate_required("title", title)?;
        }
        if let Some(author) = &patch.author {
            validate_required("author", author)?;
        }
        if let Some(category) = &patch.category {
            validate_required("category", category)?;
        }
        if let Some(barcode) = &patch.barcode {
            validate_barcode(barcode)?;
        }
        if let Some(price) = patch.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(quantity) = patch.quantity {
            validate_stock(quantity)?;
        }

        self.with_inner(|inner| {
            if let Some(barcode) = &patch.barcode {
                if inner
                    .books
                    .iter()
                    .any(|b| b.barcode == *barcode && b.id != id)
                {
                    return Err(ValidationError::Duplicate {
                        field: "barcode".to_string(),
                        value: barcode.clone(),
                    }
                    .into());
                }
            }

            let book = inner
                .books
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| StoreError::Core(CoreError::BookNotFound(id.to_string())))?;

            if let Some(v) = patch.barcode.clone() {
                book.barcode = v;
            }
            if let Some(v) = patch.title.clone() {
                book.title = v;
            }
            if let Some(v) = patch.author.clone() {
                book.author = v;
            }
            if let Some(v) = patch.price_cents {
                book.price_cents = v;
            }
            if let Some(v) = patch.quantity {
                book.quantity = v;
            }
            if let Some(v) = patch.category.clone() {
                book.category = v;
            }
            if let Some(v) = patch.description.clone() {
                book.description = v;
            }
            if let Some(v) = patch.image_url.clone() {
                book.image_url = v;
            }
            if let Some(v) = patch.rating {
                book.rating = Some(v);
            }
            if let Some(v) = patch.reviews {
                book.reviews = Some(v);
            }

            debug!(book_id = %id, "Book updated");
            Ok(book.clone())
        })
    }

    /// Removes a catalog entry.
    pub fn delete_book(&self, id: &str) -> StoreResult<()> {
        self.with_inner(|inner| {
            let initial_len = inner.books.len();
            inner.books.retain(|b| b.id != id);

            if inner.books.len() == initial_len {
                Err(StoreError::Core(CoreError::BookNotFound(id.to_string())))
            } else {
                info!(book_id = %id, "Book deleted");
                Ok(())
            }
        })
    }

    // -------------------------------------------------------------------------
    // Stock management
    // -------------------------------------------------------------------------

    /// Sets a book's stock level exactly.
    pub fn set_stock(&self, id: &str, quantity: i64) -> StoreResult<i64> {
        validate_stock(quantity)?;
        self.with_inner(|inner| {
            let book = inner
                .books
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| StoreError::Core(CoreError::BookNotFound(id.to_string())))?;

            book.quantity = quantity;
            debug!(book_id = %id, stock = quantity, "Stock set");
            Ok(book.quantity)
        })
    }

    /// Adjusts a book's stock by a delta (positive restocks, negative
    /// subtracts).
    ///
    /// ## Errors
    /// `InsufficientStock` when the subtraction would go below zero.
    pub fn adjust_stock(&self, id: &str, delta: i64) -> StoreResult<i64> {
        self.with_inner(|inner| {
            let book = inner
                .books
                .iter_mut()
                .find(|b| b.id == id)
                .ok_or_else(|| StoreError::Core(CoreError::BookNotFound(id.to_string())))?;

            let new_quantity = book.quantity + delta;
            if new_quantity < 0 {
                return Err(StoreError::Core(CoreError::InsufficientStock {
                    title: book.title.clone(),
                    available: book.quantity,
                    requested: -delta,
                }));
            }

            book.quantity = new_quantity;
            debug!(book_id = %id, delta, stock = new_quantity, "Stock adjusted");
            Ok(new_quantity)
        })
    }

    /// Consumes stock for a placed order, saturating at zero.
    ///
    /// Checkout performs no stock *check* (the view layer gates
    /// over-ordering), so an oversell is logged instead of failing the
    /// order.
    pub fn consume_stock(&self, id: &str, quantity: i64) {
        self.with_inner(|inner| {
            match inner.books.iter_mut().find(|b| b.id == id) {
                Some(book) => {
                    if book.quantity < quantity {
                        warn!(
                            book_id = %id,
                            available = book.quantity,
                            requested = quantity,
                            "Order consumed more stock than available, clamping to zero"
                        );
                    }
                    book.quantity = (book.quantity - quantity).max(0);
                }
                None => {
                    warn!(book_id = %id, "Ordered book no longer in catalog, stock untouched");
                }
            }
        });
    }

    fn with_inner<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Inner) -> R,
    {
        let mut inner = self.inner.lock().expect("Catalog mutex poisoned");
        f(&mut inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, category: &str, price: i64) -> Book {
        Book {
            id: Uuid::new_v4().to_string(),
            barcode: Uuid::new_v4().to_string(),
            title: title.to_string(),
            author: author.to_string(),
            price_cents: price,
            quantity: 10,
            category: category.to_string(),
            description: String::new(),
            image_url: String::new(),
            rating: None,
            reviews: None,
        }
    }

    fn new_book(title: &str, barcode: &str) -> NewBook {
        NewBook {
            barcode: barcode.to_string(),
            title: title.to_string(),
            author: "Someone".to_string(),
            price_cents: 1000,
            quantity: 5,
            category: "Fiction".to_string(),
            description: String::new(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_search_filters_by_title() {
        let store = BookStore::with_catalog(vec![
            book("Go in Action", "William Kennedy", "Programming", 3999),
            book("1984", "George Orwell", "Fiction", 1499),
        ]);

        store.set_search_query("go").unwrap();
        let books = store.filtered_books();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Go in Action");
    }

    #[test]
    fn test_category_filter() {
        let store = BookStore::with_catalog(vec![
            book("Go in Action", "William Kennedy", "Programming", 3999),
            book("1984", "George Orwell", "Fiction", 1499),
        ]);

        store.set_category(Some("Fiction"));
        let books = store.filtered_books();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "1984");

        store.set_category(None);
        assert_eq!(store.filtered_books().len(), 2);
    }

    #[test]
    fn test_sort_by_price() {
        let store = BookStore::with_catalog(vec![
            book("A", "x", "c", 500),
            book("B", "y", "c", 100),
            book("C", "z", "c", 300),
        ]);

        store.set_sort_key(SortKey::PriceLow);
        let prices: Vec<i64> = store.filtered_books().iter().map(|b| b.price_cents).collect();
        assert_eq!(prices, vec![100, 300, 500]);

        store.set_sort_key(SortKey::PriceHigh);
        let prices: Vec<i64> = store.filtered_books().iter().map(|b| b.price_cents).collect();
        assert_eq!(prices, vec![500, 300, 100]);
    }

    #[test]
    fn test_sort_by_rating_missing_counts_zero() {
        let mut unrated = book("Unrated", "x", "c", 100);
        unrated.rating = None;
        let mut high = book("High", "y", "c", 100);
        high.rating = Some(4.8);
        let mut low = book("Low", "z", "c", 100);
        low.rating = Some(2.1);

        let store = BookStore::with_catalog(vec![unrated, low, high]);
        store.set_sort_key(SortKey::Rating);

        let titles: Vec<String> = store.filtered_books().iter().map(|b| b.title.clone()).collect();
        assert_eq!(titles, vec!["High", "Low", "Unrated"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let store = BookStore::with_catalog(vec![
            book("First", "a", "c", 100),
            book("Second", "b", "c", 100),
            book("Third", "c", "c", 100),
        ]);

        store.set_sort_key(SortKey::PriceLow);
        let titles: Vec<String> = store.filtered_books().iter().map(|b| b.title.clone()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_categories_with_counts() {
        let store = BookStore::with_catalog(vec![
            book("A", "x", "Programming", 100),
            book("B", "y", "Fiction", 100),
            book("C", "z", "Programming", 100),
        ]);

        let categories = store.categories();
        assert_eq!(
            categories,
            vec![
                CategoryCount { name: "all".to_string(), count: 3 },
                CategoryCount { name: "Programming".to_string(), count: 2 },
                CategoryCount { name: "Fiction".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_add_book_validates_required_fields() {
        let store = BookStore::new();

        let mut missing_title = new_book("", "123");
        missing_title.title = String::new();
        assert!(store.add_book(missing_title).is_err());

        let mut negative_price = new_book("Ok", "123");
        negative_price.price_cents = -5;
        assert!(store.add_book(negative_price).is_err());

        let mut negative_stock = new_book("Ok", "123");
        negative_stock.quantity = -1;
        assert!(store.add_book(negative_stock).is_err());
    }

    #[test]
    fn test_add_book_rejects_duplicate_barcode() {
        let store = BookStore::new();
        store.add_book(new_book("One", "123")).unwrap();
        let err = store.add_book(new_book("Two", "123")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_update_and_delete_book() {
        let store = BookStore::new();
        let book = store.add_book(new_book("One", "123")).unwrap();

        let updated = store
            .update_book(
                &book.id,
                BookPatch {
                    price_cents: Some(2500),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price_cents, 2500);
        assert_eq!(store.get_book(&book.id).unwrap().price_cents, 2500);

        store.delete_book(&book.id).unwrap();
        assert!(store.get_book(&book.id).is_none());
        assert!(store.delete_book(&book.id).is_err());
    }

    #[test]
    fn test_get_book_miss_is_none() {
        let store = BookStore::new();
        assert!(store.get_book("ghost").is_none());
        assert!(store.price_of("ghost").is_none());
    }

    #[test]
    fn test_stock_operations() {
        let store = BookStore::new();
        let book = store.add_book(new_book("One", "123")).unwrap();

        assert_eq!(store.set_stock(&book.id, 20).unwrap(), 20);
        assert_eq!(store.adjust_stock(&book.id, -5).unwrap(), 15);
        assert_eq!(store.adjust_stock(&book.id, 5).unwrap(), 20);

        let err = store.adjust_stock(&book.id, -100).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { .. })
        ));
        assert!(store.set_stock(&book.id, -1).is_err());
    }

    #[test]
    fn test_consume_stock_saturates_at_zero() {
        let store = BookStore::new();
        let book = store.add_book(new_book("One", "123")).unwrap();
        store.set_stock(&book.id, 3).unwrap();

        store.consume_stock(&book.id, 5);
        assert_eq!(store.get_book(&book.id).unwrap().quantity, 0);

        // Unknown ids are ignored.
        store.consume_stock("ghost", 1);
    }
}

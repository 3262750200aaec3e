//! # Seed Data
//!
//! The hard-coded demo dataset: two accounts (one admin, one customer)
//! and the starter catalog. Ids are stable strings so persisted carts
//! and wishlists survive a restart against the same seed.

use bookstore_core::{Book, Role, User};

/// The demo accounts every fresh install knows about.
pub fn demo_accounts() -> Vec<User> {
    vec![
        User {
            id: "u-admin".to_string(),
            username: "admin".to_string(),
            password: "admin123".to_string(),
            firstname: "Ada".to_string(),
            lastname: "Stone".to_string(),
            email: "admin@bookstore.test".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Admin Way".to_string(),
            role: Role::Admin,
        },
        User {
            id: "u-john".to_string(),
            username: "john".to_string(),
            password: "john123".to_string(),
            firstname: "John".to_string(),
            lastname: "Reader".to_string(),
            email: "john@example.com".to_string(),
            phone: "555-0101".to_string(),
            address: "42 Paperback Lane".to_string(),
            role: Role::Customer,
        },
    ]
}

fn seed(
    id: &str,
    barcode: &str,
    title: &str,
    author: &str,
    price_cents: i64,
    quantity: i64,
    category: &str,
    description: &str,
    rating: f64,
    reviews: i64,
) -> Book {
    Book {
        id: id.to_string(),
        barcode: barcode.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        price_cents,
        quantity,
        category: category.to_string(),
        description: description.to_string(),
        image_url: format!("/images/{id}.jpg"),
        rating: Some(rating),
        reviews: Some(reviews),
    }
}

/// The starter catalog.
pub fn sample_catalog() -> Vec<Book> {
    vec![
        seed(
            "b-1",
            "978-1617291784",
            "Go in Action",
            "William Kennedy",
            3999,
            12,
            "Programming",
            "Hands-on introduction to building real programs in Go.",
            4.4,
            212,
        ),
        seed(
            "b-2",
            "978-1593278281",
            "The Rust Programming Language",
            "Steve Klabnik",
            3995,
            8,
            "Programming",
            "The official book on Rust, from installation to advanced traits.",
            4.7,
            540,
        ),
        seed(
            "b-3",
            "978-0451524935",
            "1984",
            "George Orwell",
            1499,
            25,
            "Fiction",
            "A dystopian classic of surveillance and control.",
            4.8,
            10234,
        ),
        seed(
            "b-4",
            "978-0061120084",
            "To Kill a Mockingbird",
            "Harper Lee",
            1599,
            18,
            "Fiction",
            "A story of justice and childhood in the American South.",
            4.8,
            8891,
        ),
        seed(
            "b-5",
            "978-0735211292",
            "Atomic Habits",
            "James Clear",
            2499,
            30,
            "Self-Help",
            "Small habits, remarkable results.",
            4.6,
            15420,
        ),
        seed(
            "b-6",
            "978-0062316097",
            "Sapiens",
            "Yuval Noah Harari",
            2299,
            4,
            "History",
            "A brief history of humankind.",
            4.5,
            9102,
        ),
        seed(
            "b-7",
            "978-0132350884",
            "Clean Code",
            "Robert C. Martin",
            4299,
            0,
            "Programming",
            "A handbook of agile software craftsmanship.",
            4.2,
            3120,
        ),
        seed(
            "b-8",
            "978-0544003415",
            "The Lord of the Rings",
            "J. R. R. Tolkien",
            3499,
            15,
            "Fiction",
            "The one-volume edition of the epic.",
            4.9,
            20011,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_accounts_cover_both_roles() {
        let accounts = demo_accounts();
        assert!(accounts.iter().any(|u| u.is_admin()));
        assert!(accounts.iter().any(|u| !u.is_admin()));
    }

    #[test]
    fn test_catalog_ids_and_barcodes_are_unique() {
        let books = sample_catalog();
        for (i, a) in books.iter().enumerate() {
            for b in &books[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.barcode, b.barcode);
            }
        }
    }

    #[test]
    fn test_catalog_has_an_out_of_stock_title() {
        assert!(sample_catalog().iter().any(|b| !b.in_stock()));
    }
}

//! Integration tests for Corner Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Prepare a database
//! export DATABASE_URL=postgres://localhost/corner_shop_test
//! cargo run -p corner-shop-cli -- migrate
//!
//! # Start both servers against it, then
//! cargo test -p corner-shop-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `repositories` - Repository behavior against a real database
//! - `storefront_flow` - Basket and checkout over HTTP
//! - `admin_flow` - Back-office product and order management over HTTP
//!
//! Every test that needs a database or a server is `#[ignore]`d.

use corner_shop_core::db::{MIGRATOR, ProductRepository, create_pool};
use corner_shop_core::{NewProduct, Price, Product};
use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client that keeps cookies and does not follow redirects.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Connect to `DATABASE_URL` and apply migrations.
///
/// # Panics
///
/// Panics if the variable is unset, the database is unreachable or a
/// migration fails.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// A name no other test run will use.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::new_v4().simple())
}

/// Insert a product in its own unique category.
///
/// # Panics
///
/// Panics if the price is invalid or the insert fails.
pub async fn insert_product(pool: &PgPool, price: &str) -> Product {
    ProductRepository::new(pool)
        .create(&NewProduct {
            name: unique("Product"),
            category: unique("Cat"),
            price: Price::parse(price).expect("valid price"),
            photo: None,
        })
        .await
        .expect("Failed to insert product")
}

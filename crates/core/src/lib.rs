//! Corner Shop Core - Shared domain library.
//!
//! This crate provides the pieces used by every Corner Shop component:
//! - `storefront` - Public catalog, basket and checkout
//! - `admin` - Back office for products and orders
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! Everything outside [`db`] is pure: newtypes, the session basket, the
//! visit log and form validation. None of it performs I/O, so it can be
//! tested without a database or an HTTP server.
//!
//! The [`db`] module (enabled by the `postgres` feature) holds the catalog
//! repositories and the migrations for the `shop` schema.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses
//! - [`models`] - Catalog records (products, orders, order line items)
//! - [`basket`] - The session basket and its per-product totals
//! - [`visits`] - Per-session page visit history
//! - [`forms`] - Validation for customer and product forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod basket;
pub mod forms;
pub mod models;
pub mod types;
pub mod visits;

#[cfg(feature = "postgres")]
pub mod db;

pub use basket::{Basket, BasketAction, BasketError, BasketLine};
pub use forms::{CheckoutForm, FormErrors, ProductForm};
pub use models::{CustomerDetails, NewProduct, Order, OrderLineItem, Product};
pub use types::*;
pub use visits::{Visit, VisitError, VisitLog};

//! Catalog records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, OrderLineItemId, OrderStatus, Price, ProductId};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Price,
    /// Path of the photo relative to the media root, e.g. `products/<uuid>.jpg`.
    pub photo: Option<String>,
}

/// Validated input for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Price,
    pub photo: Option<String>,
}

/// Validated customer fields from the checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Email,
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Email,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// "First Last" for listings.
    #[must_use]
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A product and quantity belonging to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: OrderLineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub amount: i32,
}

//! Order repository.
//!
//! Checkout writes an order and all of its line items in one transaction:
//! either the order exists with every line, or nothing was written.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{RepositoryError, map_foreign_key};
use crate::basket::BasketLine;
use crate::models::{CustomerDetails, Order, OrderLineItem};
use crate::types::{Email, OrderId, OrderLineItemId, OrderStatus, ProductId};

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    first_name: String,
    last_name: String,
    phone: String,
    email: Email,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            email: row.email,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for line items joined with their product name.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: OrderLineItemId,
    order_id: OrderId,
    product_id: ProductId,
    amount: i32,
    product_name: String,
}

/// A line item together with the name of its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub item: OrderLineItem,
    pub product_name: String,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            item: OrderLineItem {
                id: row.id,
                order_id: row.order_id,
                product_id: row.product_id,
                amount: row.amount,
            },
            product_name: row.product_name,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order with status `new` and one line item per basket line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a line references a product that
    /// no longer exists, `RepositoryError::Database` for other failures. The
    /// transaction is rolled back in both cases.
    pub async fn create_with_line_items(
        &self,
        customer: &CustomerDetails,
        lines: &[BasketLine],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order: Order = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO shop.customer_order (first_name, last_name, phone, email, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, phone, email, status, created_at
            ",
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(OrderStatus::default())
        .fetch_one(&mut *tx)
        .await?
        .into();

        for line in lines {
            let amount = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?;
            sqlx::query(
                r"
                INSERT INTO shop.order_line_item (order_id, product_id, amount)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_foreign_key(e, &format!("product {} does not exist", line.product_id)))?;
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, lines = lines.len(), "Order created");
        Ok(order)
    }

    /// List orders newest first, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, first_name, last_name, phone, email, status, created_at
            FROM shop.customer_order
            WHERE $1::shop.order_status IS NULL OR status = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, first_name, last_name, phone, email, status, created_at
            FROM shop.customer_order
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Line items of an order with their product names, in creation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_items(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT li.id, li.order_id, li.product_id, li.amount, p.name AS product_name
            FROM shop.order_line_item li
            JOIN shop.product p ON p.id = li.product_id
            WHERE li.order_id = $1
            ORDER BY li.id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    /// Change the status of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.customer_order SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("order {id}")));
        }
        tracing::info!(order_id = %id, %status, "Order status updated");
        Ok(())
    }

    /// Add a line item to an existing order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order or product does not
    /// exist.
    pub async fn add_line_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        amount: i32,
    ) -> Result<OrderLineItemId, RepositoryError> {
        let (id,): (OrderLineItemId,) = sqlx::query_as(
            r"
            INSERT INTO shop.order_line_item (order_id, product_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(amount)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_foreign_key(e, "order or product does not exist"))?;

        Ok(id)
    }

    /// Remove a line item from an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such line belongs to the order.
    pub async fn remove_line_item(
        &self,
        order_id: OrderId,
        line_id: OrderLineItemId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.order_line_item WHERE id = $1 AND order_id = $2")
                .bind(line_id)
                .bind(order_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "line {line_id} of order {order_id}"
            )));
        }
        Ok(())
    }

    /// Delete an order and, by cascade, its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.customer_order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("order {id}")));
        }
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }
}

//! Product repository.

use std::collections::HashMap;

use sqlx::PgPool;

use super::{RepositoryError, map_foreign_key};
use crate::models::{NewProduct, Product};
use crate::types::{Price, ProductId};

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category: String,
    price: Price,
    photo: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            price: row.price,
            photo: row.photo,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products ordered by id, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, photo
            FROM shop.product
            WHERE $1::text IS NULL OR category = $1
            ORDER BY id
            ",
        )
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Distinct categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT category FROM shop.product ORDER BY category")
                .fetch_all(self.pool)
                .await?;

        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, photo
            FROM shop.product
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Fetch every product in `ids`, keyed by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` naming the first id that does not
    /// exist, or `RepositoryError::Database` if the query fails.
    pub async fn get_many(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, category, price, photo
            FROM shop.product
            WHERE id = ANY($1)
            ",
        )
        .bind(raw)
        .fetch_all(self.pool)
        .await?;

        let found: HashMap<ProductId, Product> = rows
            .into_iter()
            .map(|row| (row.id, Product::from(row)))
            .collect();

        if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
            return Err(RepositoryError::NotFound(format!("product {missing}")));
        }

        Ok(found)
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO shop.product (name, category, price, photo)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, category, price, photo
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.photo)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(product_id = %row.id, name = %row.name, "Product created");
        Ok(row.into())
    }

    /// Update name, category and price. The photo is replaced only when
    /// `product.photo` is set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE shop.product
            SET name = $2, category = $3, price = $4, photo = COALESCE($5, photo)
            WHERE id = $1
            RETURNING id, name, category, price, photo
            ",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(&product.photo)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;

        Ok(row.into())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if order lines still reference it,
    /// `RepositoryError::NotFound` if it does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_foreign_key(e, "product is referenced by orders"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

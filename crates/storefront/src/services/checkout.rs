//! Basket pricing and checkout.

use std::collections::HashMap;

use sqlx::PgPool;
use tower_sessions::Session;

use corner_shop_core::db::{OrderRepository, ProductRepository, RepositoryError};
use corner_shop_core::{Basket, BasketLine, CheckoutForm, FormErrors, Order, Price, Product, ProductId};

use super::BasketSession;
use crate::error::AppError;

/// Non-field error shown when checkout is submitted with an empty basket.
pub const EMPTY_BASKET_MESSAGE: &str = "The basket contains no items.";

/// One distinct product in the priced basket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub product: Product,
    pub quantity: u32,
    pub line_total: Price,
}

/// The basket with prices filled in from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasketSummary {
    pub lines: Vec<SummaryLine>,
    pub total: Price,
}

impl BasketSummary {
    /// Price `lines` using `products`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if a line's product is missing.
    pub fn build(
        lines: &[BasketLine],
        products: &HashMap<ProductId, Product>,
    ) -> Result<Self, RepositoryError> {
        let lines = lines
            .iter()
            .map(|line| {
                let product = products
                    .get(&line.product_id)
                    .cloned()
                    .ok_or_else(|| RepositoryError::NotFound(format!("product {}", line.product_id)))?;
                Ok(SummaryLine {
                    line_total: product.price.times(line.quantity),
                    quantity: line.quantity,
                    product,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        let total = lines.iter().map(|line| line.line_total).sum();

        Ok(Self { lines, total })
    }

    /// Price the basket against the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not a product id, a product no longer
    /// exists, or the query fails.
    pub async fn load(pool: &PgPool, basket: &Basket) -> Result<Self, AppError> {
        let lines = basket.lines()?;
        if lines.is_empty() {
            return Ok(Self::default());
        }
        let ids: Vec<ProductId> = lines.iter().map(|line| line.product_id).collect();
        let products = ProductRepository::new(pool).get_many(&ids).await?;
        Ok(Self::build(&lines, &products)?)
    }
}

/// Result of a checkout submission.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The order was written and the basket cleared.
    Placed(Order),
    /// The form must be shown again with these errors.
    Rejected(FormErrors),
}

/// Validate the customer form and place the order.
///
/// Field errors win over the empty-basket check. The order and its line
/// items are written in one transaction; the basket is cleared only after
/// that transaction commits.
///
/// # Errors
///
/// Returns an error if the basket cannot be read or parsed, or the order
/// cannot be written. Nothing is persisted and the basket is kept.
pub async fn place_order(
    pool: &PgPool,
    session: &Session,
    form: &CheckoutForm,
) -> Result<CheckoutOutcome, AppError> {
    let customer = match form.validate() {
        Ok(customer) => customer,
        Err(errors) => return Ok(CheckoutOutcome::Rejected(errors)),
    };

    let baskets = BasketSession::new(session);
    let basket = baskets.load().await?;
    if basket.is_empty() {
        let mut errors = FormErrors::new();
        errors.add_non_field(EMPTY_BASKET_MESSAGE);
        return Ok(CheckoutOutcome::Rejected(errors));
    }

    let lines = basket.lines()?;
    let order = OrderRepository::new(pool)
        .create_with_line_items(&customer, &lines)
        .await?;

    baskets.clear().await?;
    Ok(CheckoutOutcome::Placed(order))
}

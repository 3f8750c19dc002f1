//! Order detail page handler.

use askama::Template;
use axum::{
    extract::{Path, State},
    response::Html,
};
use tracing::instrument;

use corner_shop_core::db::{OrderRepository, ProductRepository};
use corner_shop_core::{FormErrors, OrderId};

use super::types::{LineItemView, OrderView, StatusOption};
use crate::error::{AppError, Result};
use crate::routes::render;
use crate::state::AppState;

/// A product choice for the add-line form.
#[derive(Debug, Clone)]
pub struct ProductOption {
    pub id: i32,
    pub label: String,
}

/// Order detail page template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub order: OrderView,
    pub lines: Vec<LineItemView>,
    pub statuses: Vec<StatusOption>,
    pub products: Vec<ProductOption>,
    /// Errors from a rejected add-line submission.
    pub errors: FormErrors,
}

pub(super) fn parse_id(id: &str) -> Result<OrderId> {
    id.parse()
        .map_err(|_| AppError::NotFound(format!("order {id}")))
}

/// Render the detail page for `id` with `errors` on the add-line form.
pub(super) async fn render_detail(
    state: &AppState,
    id: OrderId,
    errors: FormErrors,
) -> Result<Html<String>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let lines = orders.line_items(id).await?;
    let products = ProductRepository::new(state.pool()).list(None).await?;

    render(&OrderShowTemplate {
        order: OrderView::from(&order),
        lines: lines.iter().map(LineItemView::from).collect(),
        statuses: StatusOption::all(Some(order.status)),
        products: products
            .iter()
            .map(|p| ProductOption {
                id: p.id.as_i32(),
                label: format!("{} ({})", p.name, p.price),
            })
            .collect(),
        errors,
    })
}

/// Order detail page handler.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    render_detail(&state, parse_id(&id)?, FormErrors::new()).await
}

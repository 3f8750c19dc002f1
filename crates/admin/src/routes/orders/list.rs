//! Orders list page handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tracing::instrument;

use corner_shop_core::OrderStatus;
use corner_shop_core::db::OrderRepository;

use super::types::{OrderView, StatusOption};
use crate::error::{AppError, Result};
use crate::routes::render;
use crate::state::AppState;

/// Order listing filter parameters.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

impl OrdersQuery {
    /// The requested status filter; empty means all orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown status.
    pub fn status(&self) -> Result<Option<OrderStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(AppError::BadRequest),
        }
    }
}

/// Orders list page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderView>,
    pub statuses: Vec<StatusOption>,
    pub filtered: bool,
}

/// Orders list page handler, newest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Html<String>> {
    let status = query.status()?;
    let orders = OrderRepository::new(state.pool()).list(status).await?;

    render(&OrdersIndexTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
        statuses: StatusOption::all(status),
        filtered: status.is_some(),
    })
}

//! Single order action handlers.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use corner_shop_core::db::{OrderRepository, RepositoryError};
use corner_shop_core::{FormErrors, OrderLineItemId, OrderStatus, ProductId};

use super::detail::{parse_id, render_detail};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Input for changing an order's status.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

/// Input for adding a line item.
#[derive(Debug, Default, Deserialize)]
pub struct AddLineInput {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub amount: String,
}

impl AddLineInput {
    /// Parse the product choice and an amount of at least one.
    ///
    /// # Errors
    ///
    /// Returns the field errors if either value is missing or invalid.
    pub fn validate(&self) -> std::result::Result<(ProductId, i32), FormErrors> {
        let mut errors = FormErrors::new();

        let product_id = self.product_id.trim().parse::<ProductId>().ok();
        if product_id.is_none() {
            errors.add("product_id", "Select a product.");
        }

        let amount = match self.amount.trim().parse::<i32>() {
            Ok(amount) if amount >= 1 => Some(amount),
            Ok(_) => {
                errors.add("amount", "Ensure this value is greater than or equal to 1.");
                None
            }
            Err(_) => {
                errors.add("amount", "Enter a whole number.");
                None
            }
        };

        match (product_id, amount) {
            (Some(product_id), Some(amount)) => Ok((product_id, amount)),
            _ => Err(errors),
        }
    }
}

fn detail_url(id: impl std::fmt::Display) -> String {
    format!("/orders/{id}")
}

/// Change order status handler.
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<StatusInput>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;
    let status: OrderStatus = input.status.parse().map_err(AppError::BadRequest)?;

    OrderRepository::new(state.pool())
        .update_status(id, status)
        .await?;

    Ok(Redirect::to(&detail_url(id)))
}

/// Add line item handler.
///
/// Invalid input re-renders the detail page with the errors.
#[instrument(skip(state))]
pub async fn add_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(input): Form<AddLineInput>,
) -> Result<Response> {
    let id = parse_id(&id)?;

    let (product_id, amount) = match input.validate() {
        Ok(parsed) => parsed,
        Err(errors) => return Ok(render_detail(&state, id, errors).await?.into_response()),
    };

    match OrderRepository::new(state.pool())
        .add_line_item(id, product_id, amount)
        .await
    {
        Ok(line_id) => {
            tracing::info!(order_id = %id, %line_id, %product_id, amount, "Line item added");
            Ok(Redirect::to(&detail_url(id)).into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            let mut errors = FormErrors::new();
            errors.add("product_id", "That product no longer exists.");
            Ok(render_detail(&state, id, errors).await?.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove line item handler.
#[instrument(skip(state))]
pub async fn remove_line(
    State(state): State<AppState>,
    Path((id, line_id)): Path<(String, String)>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;
    let line_id: OrderLineItemId = line_id
        .parse()
        .map_err(|_| AppError::NotFound(format!("line {line_id}")))?;

    OrderRepository::new(state.pool())
        .remove_line_item(id, line_id)
        .await?;
    tracing::info!(order_id = %id, %line_id, "Line item removed");

    Ok(Redirect::to(&detail_url(id)))
}

/// Delete order handler. Line items go with it.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let id = parse_id(&id)?;
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(Redirect::to("/orders"))
}

//! Product management route handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use corner_shop_core::db::{ProductRepository, RepositoryError};
use corner_shop_core::{FormErrors, Product, ProductForm, ProductId};

use super::render;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product row for the listing.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: String,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
        }
    }
}

/// Category filter link.
#[derive(Debug, Clone)]
pub struct CategoryFilterView {
    pub name: String,
    pub active: bool,
}

/// Product listing filter parameters.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

/// Products list page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductRowView>,
    pub categories: Vec<CategoryFilterView>,
    pub filtered: bool,
}

/// Create/edit product page template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    /// `None` while creating.
    pub product_id: Option<i32>,
    pub photo: Option<String>,
    pub form: ProductForm,
    pub errors: FormErrors,
}

impl ProductFormTemplate {
    fn for_product(product: &Product) -> Self {
        Self {
            product_id: Some(product.id.as_i32()),
            photo: product.photo.clone(),
            form: ProductForm {
                name: product.name.clone(),
                category: product.category.clone(),
                price: product.price.to_string(),
            },
            errors: FormErrors::new(),
        }
    }
}

fn parse_id(id: &str) -> Result<ProductId> {
    id.parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))
}

async fn load(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Products list page handler.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Html<String>> {
    let category = query.category.filter(|c| !c.is_empty());
    let repo = ProductRepository::new(state.pool());

    let products = repo.list(category.as_deref()).await?;
    let categories = repo
        .categories()
        .await?
        .into_iter()
        .map(|name| CategoryFilterView {
            active: category.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();

    render(&ProductsIndexTemplate {
        products: products.iter().map(ProductRowView::from).collect(),
        categories,
        filtered: category.is_some(),
    })
}

/// New product form handler.
#[instrument]
pub async fn new() -> Result<Html<String>> {
    render(&ProductFormTemplate {
        product_id: None,
        photo: None,
        form: ProductForm::default(),
        errors: FormErrors::new(),
    })
}

/// Create product handler.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let product = match form.validate() {
        Ok(product) => product,
        Err(errors) => {
            return Ok(render(&ProductFormTemplate {
                product_id: None,
                photo: None,
                form,
                errors,
            })?
            .into_response());
        }
    };

    let created = ProductRepository::new(state.pool()).create(&product).await?;
    tracing::info!(product_id = %created.id, "Product created from admin");

    Ok(Redirect::to("/products").into_response())
}

/// Edit product form handler.
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let product = load(&state, parse_id(&id)?).await?;
    render(&ProductFormTemplate::for_product(&product))
}

/// Update product handler. The stored photo is kept.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = parse_id(&id)?;

    let product = match form.validate() {
        Ok(product) => product,
        Err(errors) => {
            let existing = load(&state, id).await?;
            return Ok(render(&ProductFormTemplate {
                product_id: Some(id.as_i32()),
                photo: existing.photo,
                form,
                errors,
            })?
            .into_response());
        }
    };

    ProductRepository::new(state.pool()).update(id, &product).await?;
    tracing::info!(product_id = %id, "Product updated");

    Ok(Redirect::to("/products").into_response())
}

/// Delete product handler.
///
/// Products referenced by order lines cannot be deleted; the edit page is
/// shown again with a message instead.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let id = parse_id(&id)?;

    match ProductRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "Product deleted");
            Ok(Redirect::to("/products").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            tracing::warn!(product_id = %id, "Refused to delete ordered product");
            let product = load(&state, id).await?;
            let mut template = ProductFormTemplate::for_product(&product);
            template.errors.add_non_field(
                "This product appears in orders and cannot be deleted. Remove it from those orders first.",
            );
            Ok((StatusCode::CONFLICT, render(&template)?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

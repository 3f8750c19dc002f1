//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use corner_shop_core::db::ProductRepository;
use corner_shop_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::services::BasketSession;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: String,
    pub photo_url: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            photo_url: product.photo.as_ref().map(|photo| format!("/media/{photo}")),
        }
    }
}

/// A category filter link.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub name: String,
    pub selected: bool,
}

/// Catalog filter parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub basket_count: usize,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryLink>,
    pub selected_category: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub basket_count: usize,
    pub product: ProductView,
}

/// Display the product listing.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let selected_category = query
        .category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty());

    let repo = ProductRepository::new(state.pool());
    let products = repo.list(selected_category.as_deref()).await?;
    let categories = repo
        .categories()
        .await?
        .into_iter()
        .map(|name| CategoryLink {
            selected: selected_category.as_deref() == Some(name.as_str()),
            name,
        })
        .collect();

    Ok(IndexTemplate {
        basket_count: BasketSession::new(&session).count().await,
        products: products.iter().map(ProductView::from).collect(),
        categories,
        selected_category,
    })
}

/// Display one product.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product_id: ProductId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("product {id}")))?;

    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        basket_count: BasketSession::new(&session).count().await,
        product: ProductView::from(&product),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use corner_shop_core::Price;

    use super::*;

    #[test]
    fn test_product_view_formats_price_and_photo() {
        let product = Product {
            id: ProductId::new(4),
            name: "Kettle".to_string(),
            category: "Kitchen".to_string(),
            price: Price::parse("12.5").unwrap(),
            photo: Some("products/abc.jpg".to_string()),
        };

        let view = ProductView::from(&product);
        assert_eq!(view.id, 4);
        assert_eq!(view.price, "12.50");
        assert_eq!(view.photo_url.as_deref(), Some("/media/products/abc.jpg"));
    }

    #[test]
    fn test_product_view_without_photo() {
        let product = Product {
            id: ProductId::new(1),
            name: "Mug".to_string(),
            category: "Kitchen".to_string(),
            price: Price::ZERO,
            photo: None,
        };
        assert!(ProductView::from(&product).photo_url.is_none());
    }
}

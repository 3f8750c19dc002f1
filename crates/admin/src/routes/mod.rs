//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Redirect to orders
//!
//! # Products
//! GET  /products                           - Product listing, optional ?category=
//! GET  /products/new                       - New product form
//! POST /products                           - Create product
//! GET  /products/{id}                      - Edit form
//! POST /products/{id}                      - Update product
//! POST /products/{id}/delete               - Delete product (refused while ordered)
//!
//! # Orders
//! GET  /orders                             - Order listing, optional ?status=
//! GET  /orders/{id}                        - Order detail with line items
//! POST /orders/{id}/status                 - Change status
//! POST /orders/{id}/lines                  - Add a line item
//! POST /orders/{id}/lines/{line_id}/delete - Remove a line item
//! POST /orders/{id}/delete                 - Delete order
//! ```
//!
//! HTML forms can only GET and POST, so deletes are POSTs to a `/delete`
//! suffix.

pub mod orders;
pub mod products;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
    routing::{get, post},
};

use crate::error::Result;
use crate::state::AppState;

/// Render a template into an HTML response.
pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", get(products::edit).post(products::update))
        .route("/{id}/delete", post(products::delete))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/lines", post(orders::add_line))
        .route("/{id}/lines/{line_id}/delete", post(orders::remove_line))
        .route("/{id}/delete", post(orders::delete))
}

/// Create all routes for the admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/orders") }))
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;

    /// Router over a pool that never connects; only requests rejected
    /// before touching the database are sent through it.
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        routes().with_state(AppState::new(pool))
    }

    async fn status_of(request: Request<Body>) -> (StatusCode, Option<String>) {
        let response = app().oneshot(request).await.unwrap();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        (response.status(), location)
    }

    #[tokio::test]
    async fn test_root_redirects_to_orders() {
        let (status, location) = status_of(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/orders"));
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_bad_request() {
        let (status, _) =
            status_of(Request::get("/orders?status=lost").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_ids_are_not_found() {
        let (status, _) = status_of(Request::get("/orders/abc").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            status_of(Request::get("/products/abc").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

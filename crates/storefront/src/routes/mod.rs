//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Catalog (visit tracked)
//! GET  /                       - Product listing, optional ?category=
//! GET  /products/{id}          - Product detail
//! GET  /products/new           - Product form
//! POST /products/new           - Create product (multipart, optional photo)
//!
//! # Basket
//! GET  /basket/change          - Add or remove one unit, then redirect to ?next=
//! GET  /basket                 - Basket summary and checkout form (visit tracked)
//! POST /basket                 - Place the order
//! ```

pub mod basket;
pub mod catalog;
pub mod products;

use axum::{Router, extract::DefaultBodyLimit, middleware, routing::get};

use crate::middleware::track_visits;
use crate::services::media::MAX_PHOTO_BYTES;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the photo.
const PRODUCT_FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Pages whose `GET` requests are recorded in the visit history.
fn tracked_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/products/{id}", get(catalog::show))
        .route(
            "/products/new",
            get(products::new)
                .post(products::create)
                .layer(DefaultBodyLimit::max(
                    MAX_PHOTO_BYTES + PRODUCT_FORM_OVERHEAD_BYTES,
                )),
        )
        .route("/basket", get(basket::show).post(basket::submit))
        .route_layer(middleware::from_fn(track_visits))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(tracked_routes())
        .route("/basket/change", get(basket::change))
}

//! Basket and checkout handlers.
//!
//! The basket is a list of product ids kept in the session, one entry per
//! unit. `GET /basket/change` edits it and bounces back to the page the
//! visitor came from; `/basket` shows it priced and takes the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use corner_shop_core::{BasketAction, CheckoutForm, FormErrors};

use crate::error::{Result, add_breadcrumb};
use crate::services::checkout::place_order;
use crate::services::{BasketSession, BasketSummary, CheckoutOutcome, SummaryLine};
use crate::state::AppState;

/// Query parameters of `GET /basket/change`.
#[derive(Debug, Deserialize)]
pub struct ChangeQuery {
    pub pk: Option<String>,
    pub action: Option<String>,
    pub next: Option<String>,
}

/// One basket row for templates.
#[derive(Debug, Clone)]
pub struct BasketLineView {
    pub product_id: i32,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&SummaryLine> for BasketLineView {
    fn from(line: &SummaryLine) -> Self {
        Self {
            product_id: line.product.id.as_i32(),
            name: line.product.name.clone(),
            price: line.product.price.to_string(),
            quantity: line.quantity,
            line_total: line.line_total.to_string(),
        }
    }
}

/// Basket page template.
#[derive(Template, WebTemplate)]
#[template(path = "basket/show.html")]
pub struct BasketTemplate {
    pub basket_count: usize,
    pub lines: Vec<BasketLineView>,
    pub total: String,
    pub form: CheckoutForm,
    pub errors: FormErrors,
}

impl BasketTemplate {
    fn new(basket_count: usize, summary: &BasketSummary, form: CheckoutForm, errors: FormErrors) -> Self {
        Self {
            basket_count,
            lines: summary.lines.iter().map(BasketLineView::from).collect(),
            total: summary.total.to_string(),
            form,
            errors,
        }
    }
}

/// Only same-site paths are followed; anything else goes to the index.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

/// Add or remove one unit of a product, then redirect to `next`.
///
/// `action=add` appends the id; any other action removes its first
/// occurrence. Without a `pk` the basket is left alone.
#[instrument(skip(session))]
pub async fn change(session: Session, Query(query): Query<ChangeQuery>) -> Result<Redirect> {
    if let Some(pk) = query.pk.as_deref().filter(|pk| !pk.is_empty()) {
        let action = BasketAction::from_param(query.action.as_deref());
        let baskets = BasketSession::new(&session);

        let mut basket = baskets.load().await?;
        basket.apply(action, pk);
        baskets.save(&basket).await?;

        add_breadcrumb("basket", "Changed basket", Some(&[("product_id", pk)]));
        tracing::debug!(pk, ?action, count = basket.len(), "Basket changed");
    }

    Ok(Redirect::to(safe_next(query.next.as_deref())))
}

/// Display the priced basket and an empty checkout form.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let baskets = BasketSession::new(&session);
    let summary = BasketSummary::load(state.pool(), &baskets.load().await?).await?;

    Ok(BasketTemplate::new(
        baskets.count().await,
        &summary,
        CheckoutForm::default(),
        FormErrors::new(),
    ))
}

/// Place the order, or re-render the basket with the form errors.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    match place_order(state.pool(), &session, &form).await? {
        CheckoutOutcome::Placed(order) => {
            tracing::info!(order_id = %order.id, "Order placed");
            Ok(Redirect::to("/").into_response())
        }
        CheckoutOutcome::Rejected(errors) => {
            let baskets = BasketSession::new(&session);
            let summary = BasketSummary::load(state.pool(), &baskets.load().await?).await?;
            Ok(BasketTemplate::new(baskets.count().await, &summary, form, errors).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{self, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;
    use crate::models::session_keys;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(None), "/");
        assert_eq!(safe_next(Some("/products/3")), "/products/3");
        assert_eq!(safe_next(Some("/?category=tea")), "/?category=tea");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("")), "/");
    }

    /// Echoes the raw basket and its count.
    async fn peek(session: Session) -> String {
        let products: Vec<String> = session
            .get(session_keys::PRODUCTS)
            .await
            .unwrap()
            .unwrap_or_default();
        let count: usize = session
            .get(session_keys::PRODUCTS_COUNT)
            .await
            .unwrap()
            .unwrap_or_default();
        format!("{}|{count}", products.join(","))
    }

    fn app() -> Router {
        Router::new()
            .route("/basket/change", get(change))
            .route("/peek", get(peek))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    /// Basket pages over a database that is never reachable.
    fn checkout_app() -> Router {
        let state = AppState::without_database(&std::env::temp_dir());
        Router::new()
            .route("/basket", get(show).post(submit))
            .route("/basket/change", get(change))
            .route("/peek", get(peek))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(state)
    }

    fn checkout_request(fields: &str) -> http::Request<Body> {
        http::Request::post("/basket")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(fields.to_owned()))
            .unwrap()
    }

    const VALID_DETAILS: &str =
        "first_name=Ada&last_name=Lovelace&phone=%2B44+20+7946+0000&email=ada%40example.com";
    const INVALID_DETAILS: &str = "first_name=&last_name=Lovelace&phone=call+me&email=nope";

    /// Send `requests` in order on one session and return the last response.
    async fn send(app: &Router, requests: Vec<http::Request<Body>>) -> http::Response<Body> {
        let mut cookie: Option<http::HeaderValue> = None;
        let mut last = None;
        for mut request in requests {
            if let Some(cookie) = &cookie {
                request.headers_mut().insert(header::COOKIE, cookie.clone());
            }
            let response = app.clone().oneshot(request).await.unwrap();
            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                cookie = Some(http::HeaderValue::from_str(pair).unwrap());
            }
            last = Some(response);
        }
        last.unwrap()
    }

    fn get_request(uri: &str) -> http::Request<Body> {
        http::Request::get(uri).body(Body::empty()).unwrap()
    }

    /// Send GET requests for `uris` in order on one session.
    async fn visit(app: &Router, uris: &[&str]) -> http::Response<Body> {
        send(app, uris.iter().map(|uri| get_request(uri)).collect()).await
    }

    async fn body_text(response: http::Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_change_redirects_to_next() {
        let response = visit(&app(), &["/basket/change?pk=5&action=add&next=/products/5"]).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/products/5");
    }

    #[tokio::test]
    async fn test_change_rejects_offsite_next() {
        let response = visit(&app(), &["/basket/change?pk=5&action=add&next=//evil.example"]).await;
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_adds_keep_order_and_count() {
        let response = visit(
            &app(),
            &[
                "/basket/change?pk=5&action=add",
                "/basket/change?pk=3&action=add",
                "/basket/change?pk=5&action=add",
                "/peek",
            ],
        )
        .await;
        assert_eq!(body_text(response).await, "5,3,5|3");
    }

    #[tokio::test]
    async fn test_remove_takes_first_occurrence() {
        let response = visit(
            &app(),
            &[
                "/basket/change?pk=5&action=add",
                "/basket/change?pk=3&action=add",
                "/basket/change?pk=5&action=add",
                "/basket/change?pk=5&action=remove",
                "/peek",
            ],
        )
        .await;
        assert_eq!(body_text(response).await, "3,5|2");
    }

    #[tokio::test]
    async fn test_remove_of_absent_product_is_noop() {
        let response = visit(
            &app(),
            &[
                "/basket/change?pk=5&action=add",
                "/basket/change?pk=9",
                "/peek",
            ],
        )
        .await;
        assert_eq!(body_text(response).await, "5|1");
    }

    #[tokio::test]
    async fn test_missing_pk_still_redirects() {
        let response = visit(&app(), &["/basket/change?action=add&next=/basket"]).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/basket");
    }

    #[tokio::test]
    async fn test_empty_basket_checkout_is_rejected_inline() {
        // The pool never connects, so an attempt to write an order would be a 500
        let response = send(&checkout_app(), vec![checkout_request(VALID_DETAILS)]).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("The basket contains no items."));
        assert!(html.contains("value=\"Lovelace\""));
    }

    #[tokio::test]
    async fn test_field_errors_come_without_basket_error() {
        let response = send(&checkout_app(), vec![checkout_request(INVALID_DETAILS)]).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("This field is required."));
        assert!(html.contains("Enter a valid email address."));
        assert!(!html.contains("The basket contains no items."));
    }

    #[tokio::test]
    async fn test_rejected_checkout_leaves_empty_session_alone() {
        let response = send(
            &checkout_app(),
            vec![checkout_request(VALID_DETAILS), get_request("/peek")],
        )
        .await;
        assert_eq!(body_text(response).await, "|0");
    }

    #[tokio::test]
    async fn test_rejected_checkout_keeps_basket() {
        // Re-rendering prices the basket, which this pool cannot do; the
        // basket must survive whatever the response
        let response = send(
            &checkout_app(),
            vec![
                get_request("/basket/change?pk=5&action=add"),
                get_request("/basket/change?pk=3&action=add"),
                checkout_request(INVALID_DETAILS),
                get_request("/peek"),
            ],
        )
        .await;
        assert_eq!(body_text(response).await, "5,3|2");
    }
}

//! Page visit tracking.
//!
//! Applied with `from_fn` to the catalog and basket pages. Each tracked `GET`
//! updates the visit history in the session before the handler runs; other
//! methods pass through untouched.

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use corner_shop_core::{Visit, VisitLog};

use crate::error::AppError;
use crate::models::session_keys;

/// Record the current page load in the session's visit history.
///
/// The page is identified by the request path. A stored timestamp that cannot
/// be parsed fails the request with a server error.
pub async fn track_visits(session: Session, request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let page = request.uri().path().to_owned();
    if let Err(e) = record_visit(&session, &page).await {
        return e.into_response();
    }

    next.run(request).await
}

/// Load the history, apply one visit of `page`, and store it back.
async fn record_visit(session: &Session, page: &str) -> Result<(), AppError> {
    let mut log = load(session).await?;
    log.record(page, Utc::now().naive_utc())?;
    store(session, &log).await?;

    tracing::debug!(page, visits = log.visits.len(), "Recorded page visit");
    Ok(())
}

async fn load(session: &Session) -> Result<VisitLog, tower_sessions::session::Error> {
    Ok(VisitLog {
        visits: session
            .get::<Vec<Visit>>(session_keys::VISITS)
            .await?
            .unwrap_or_default(),
        old_page: session.get::<String>(session_keys::OLD_PAGE).await?,
        old_time: session.get::<String>(session_keys::OLD_TIME).await?,
    })
}

async fn store(session: &Session, log: &VisitLog) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::VISITS, &log.visits).await?;
    if let Some(old_page) = &log.old_page {
        session.insert(session_keys::OLD_PAGE, old_page).await?;
    }
    if let Some(old_time) = &log.old_time {
        session.insert(session_keys::OLD_TIME, old_time).await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{self, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_first_visit_is_stored() {
        let session = session();
        record_visit(&session, "/").await.unwrap();

        let visits: Vec<Visit> = session.get(session_keys::VISITS).await.unwrap().unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].page, "/");
        assert_eq!(visits[0].elapsed_seconds, 0);
        assert_eq!(visits[0].index, 1);

        let old_page: String = session.get(session_keys::OLD_PAGE).await.unwrap().unwrap();
        assert_eq!(old_page, "/");
        let old_time: Option<String> = session.get(session_keys::OLD_TIME).await.unwrap();
        assert!(old_time.is_some());
    }

    #[tokio::test]
    async fn test_history_is_stored_as_triples() {
        let session = session();
        record_visit(&session, "/products/1").await.unwrap();

        let raw = session.get_value(session_keys::VISITS).await.unwrap().unwrap();
        assert_eq!(raw, serde_json::json!([["/products/1", 0, 1]]));
    }

    #[tokio::test]
    async fn test_later_visit_keeps_old_page() {
        let session = session();
        record_visit(&session, "/").await.unwrap();
        record_visit(&session, "/basket").await.unwrap();

        let visits: Vec<Visit> = session.get(session_keys::VISITS).await.unwrap().unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].page, "/");
        let old_page: String = session.get(session_keys::OLD_PAGE).await.unwrap().unwrap();
        assert_eq!(old_page, "/");
    }

    #[tokio::test]
    async fn test_malformed_timestamp_fails() {
        let session = session();
        record_visit(&session, "/").await.unwrap();
        session.insert(session_keys::OLD_TIME, "yesterday").await.unwrap();

        let err = record_visit(&session, "/").await.unwrap_err();
        assert!(matches!(err, AppError::Visits(_)));
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }).post(|| async { "posted" }))
            .layer(axum::middleware::from_fn(track_visits))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
    }

    #[tokio::test]
    async fn test_get_sets_session_cookie() {
        let response = app()
            .oneshot(http::Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("set-cookie"));
    }

    #[tokio::test]
    async fn test_post_is_not_tracked() {
        let response = app()
            .oneshot(http::Request::post("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        // Nothing was written, so no session cookie is issued
        assert!(!response.headers().contains_key("set-cookie"));
    }
}

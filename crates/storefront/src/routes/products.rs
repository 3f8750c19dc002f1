//! Product creation handlers.
//!
//! The form is posted as multipart so a photo can ride along with the text
//! fields. Invalid input re-renders the form; it is never an error response.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use corner_shop_core::db::ProductRepository;
use corner_shop_core::{FormErrors, ProductForm};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::{BasketSession, MediaStore};
use crate::state::AppState;

/// Product form page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/new.html")]
pub struct ProductFormTemplate {
    pub basket_count: usize,
    pub form: ProductForm,
    pub errors: FormErrors,
}

/// An uploaded file from the `photo` field.
#[derive(Debug)]
struct PhotoUpload {
    file_name: String,
    bytes: Bytes,
}

/// Display an empty product form.
#[instrument(skip(session))]
pub async fn new(session: Session) -> impl IntoResponse {
    ProductFormTemplate {
        basket_count: BasketSession::new(&session).count().await,
        form: ProductForm::default(),
        errors: FormErrors::new(),
    }
}

/// Validate and store a new product.
#[instrument(skip(state, session, multipart))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let (form, photo) = read_form(multipart).await.map_err(|e| {
        tracing::warn!(error = %e, "Unreadable product form");
        AppError::BadRequest(e.body_text())
    })?;

    let (product, mut errors) = match form.validate() {
        Ok(product) => (Some(product), FormErrors::new()),
        Err(errors) => (None, errors),
    };
    let photo_extension = match &photo {
        Some(upload) => match MediaStore::check(&upload.file_name, upload.bytes.len()) {
            Ok(ext) => Some(ext),
            Err(rejection) => {
                errors.add("photo", rejection.to_string());
                None
            }
        },
        None => None,
    };

    let Some(mut product) = product.filter(|_| errors.is_empty()) else {
        return Ok(ProductFormTemplate {
            basket_count: BasketSession::new(&session).count().await,
            form,
            errors,
        }
        .into_response());
    };

    if let (Some(upload), Some(ext)) = (&photo, &photo_extension) {
        product.photo = Some(state.media().save(ext, &upload.bytes).await?);
    }

    let created = match ProductRepository::new(state.pool()).create(&product).await {
        Ok(created) => created,
        Err(e) => {
            if let Some(photo) = &product.photo {
                discard_photo(state.media(), photo).await;
            }
            return Err(e.into());
        }
    };
    let product_id = created.id.to_string();
    add_breadcrumb(
        "catalog",
        "Created product",
        Some(&[("product_id", product_id.as_str())]),
    );
    tracing::info!(product_id = %created.id, "Product created");

    Ok(Redirect::to("/").into_response())
}

/// Remove a photo whose product row was never written.
async fn discard_photo(media: &MediaStore, photo: &str) {
    if let Err(e) = media.remove(photo).await {
        tracing::warn!(error = %e, path = %photo, "Failed to remove orphaned photo");
    }
}

/// Collect the text fields and the optional photo from the multipart body.
async fn read_form(
    mut multipart: Multipart,
) -> std::result::Result<(ProductForm, Option<PhotoUpload>), MultipartError> {
    let mut form = ProductForm::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "name" => form.name = field.text().await?,
            "category" => form.category = field.text().await?,
            "price" => form.price = field.text().await?,
            "photo" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file is chosen
                if !file_name.is_empty() && !bytes.is_empty() {
                    photo = Some(PhotoUpload { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok((form, photo))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::Path;

    use axum::{
        Router,
        body::Body,
        http::{self, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};
    use uuid::Uuid;

    use super::*;

    const BOUNDARY: &str = "corner-shop-boundary";

    /// Product form over a database that is never reachable.
    fn app(media_dir: &Path) -> Router {
        Router::new()
            .route("/products/new", get(new).post(create))
            .layer(SessionManagerLayer::new(MemoryStore::default()))
            .with_state(AppState::without_database(media_dir))
    }

    fn multipart_request(price: &str, photo: Option<(&str, &[u8])>) -> http::Request<Body> {
        let mut body = Vec::new();
        for (name, value) in [("name", "Teapot"), ("category", "Kitchen"), ("price", price)] {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, bytes)) = photo {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        http::Request::post("/products/new")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn stored_photos(media_dir: &Path) -> usize {
        let Ok(mut entries) = tokio::fs::read_dir(media_dir.join("products")).await else {
            return 0;
        };
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    fn temp_media_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("corner-shop-products-{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_oversized_price_rerenders_form() {
        let media_dir = temp_media_dir();
        let response = app(&media_dir)
            .oneshot(multipart_request(
                "123456789012.00",
                Some(("teapot.png", b"fake image")),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("less than 100000000"));
        assert_eq!(stored_photos(&media_dir).await, 0);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_photo_behind() {
        let media_dir = temp_media_dir();
        let response = app(&media_dir)
            .oneshot(multipart_request("12.50", Some(("teapot.png", b"fake image"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(stored_photos(&media_dir).await, 0);

        let _ = tokio::fs::remove_dir_all(&media_dir).await;
    }
}

//! Storage for uploaded product photos.
//!
//! Photos are written under the media root as `products/<uuid>.<ext>` and
//! served back under `/media`. The stored relative path is what ends up in
//! the `product.photo` column.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Largest accepted photo upload.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Subdirectory of the media root holding product photos.
const PRODUCTS_DIR: &str = "products";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Errors writing a photo to disk.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons an upload is refused before anything is written.
///
/// These are shown to the user as a form error on the photo field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoRejection {
    #[error("Upload a valid image. Allowed types: jpg, jpeg, png, gif, webp.")]
    UnsupportedType,
    #[error("The photo is larger than 5 MB.")]
    TooLarge,
}

/// Filesystem store for product photos.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The directory served under `/media`.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check an upload's file name and size, returning the normalized extension.
    ///
    /// # Errors
    ///
    /// Returns `PhotoRejection` if the extension is not an image type or the
    /// upload exceeds [`MAX_PHOTO_BYTES`].
    pub fn check(file_name: &str, size: usize) -> Result<String, PhotoRejection> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or(PhotoRejection::UnsupportedType)?;

        if size > MAX_PHOTO_BYTES {
            return Err(PhotoRejection::TooLarge);
        }

        Ok(extension)
    }

    /// Write a photo under a fresh name and return its path relative to the root.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the directory cannot be created or the
    /// file cannot be written.
    pub async fn save(&self, extension: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let dir = self.root.join(PRODUCTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        let relative = format!("{PRODUCTS_DIR}/{file_name}");
        tracing::info!(path = %relative, size = bytes.len(), "Stored product photo");
        Ok(relative)
    }

    /// Delete a photo written by [`MediaStore::save`]. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the file exists but cannot be removed.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        match tokio::fs::remove_file(self.root.join(relative)).await {
            Ok(()) => {
                tracing::info!(path = %relative, "Removed product photo");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

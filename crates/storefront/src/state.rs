//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::MediaStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    media: MediaStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let media = MediaStore::new(config.media_dir.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                media,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the product photo store.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.inner.media
    }
}

#[cfg(test)]
impl AppState {
    /// State over a pool that can never connect, for requests that must be
    /// answered without the database.
    #[allow(clippy::unwrap_used)]
    pub(crate) fn without_database(media_dir: &std::path::Path) -> Self {
        const UNREACHABLE: &str = "postgres://127.0.0.1:1/unused";

        let media_dir = media_dir.to_string_lossy().into_owned();
        let config = StorefrontConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some(UNREACHABLE.to_string()),
            "STOREFRONT_MEDIA_DIR" => Some(media_dir.clone()),
            _ => None,
        })
        .unwrap();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy(UNREACHABLE)
            .unwrap();

        Self::new(config, pool)
    }
}

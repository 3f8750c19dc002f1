//! Database migration commands.
//!
//! Migrations live in `crates/core/migrations/` and are embedded into the
//! binary. Servers never migrate on start-up; run this first.

use std::collections::HashSet;

use corner_shop_core::db::{MIGRATOR, create_pool};
use sqlx::migrate::Migrate;

/// Errors from the migration commands.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("{0}")]
    Config(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::Config)?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

/// Log each known migration and whether it has been applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn status() -> Result<(), MigrationError> {
    let database_url = super::database_url().map_err(MigrationError::Config)?;
    let pool = create_pool(&database_url).await?;

    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    for migration in MIGRATOR.iter() {
        let state = if applied.contains(&migration.version) {
            "applied"
        } else {
            "pending"
        };
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            state,
            "Migration"
        );
    }
    Ok(())
}

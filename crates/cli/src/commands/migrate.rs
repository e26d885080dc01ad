//! Database migration command.
//!
//! ```bash
//! hans-cli migrate
//! ```
//!
//! Migrations live in `crates/site/migrations/` and are embedded at build
//! time. Reads `SITE_DATABASE_URL` (or `DATABASE_URL`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: SITE_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending site migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = super::connect()
        .await?
        .ok_or(MigrationError::MissingDatabaseUrl)?;

    tracing::info!("Running site migrations...");
    sqlx::migrate!("../site/migrations").run(&pool).await?;

    tracing::info!("Site migrations complete");
    Ok(())
}

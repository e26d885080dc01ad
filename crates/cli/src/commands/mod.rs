//! CLI subcommands.

pub mod migrate;
pub mod seed;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

/// Database URL from `SITE_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Connect to the site database.
///
/// Returns `None` if no database URL is configured.
async fn connect() -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url() else {
        return Ok(None);
    };
    tracing::info!("Connecting to site database...");
    hans_institute_site::db::create_pool(&url).await.map(Some)
}

//! Database operations for the site `PostgreSQL`.
//!
//! ## Tables
//!
//! - `courses`, `faculty`, `notices`, `founder_message` - Public content
//! - `inquiries` - Contact form submissions
//! - `users` - Login accounts (email + Argon2 password hash)
//! - `profiles` - Staff profile and active flag, one per user
//! - `user_roles` - At most one role per user
//! - `user_activity_log` - Admin write audit trail
//! - `tower_sessions.session` - Session storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p hans-institute-cli -- migrate
//! ```

pub mod activity;
pub mod courses;
pub mod faculty;
pub mod founders;
pub mod inquiries;
pub mod notices;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use hans_institute_core::Email;

pub use activity::ActivityRepository;
pub use courses::CourseRepository;
pub use faculty::FacultyRepository;
pub use founders::FounderMessageRepository;
pub use inquiries::InquiryRepository;
pub use notices::NoticeRepository;
pub use users::{NewStaffUser, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-key violation to `Conflict`, anything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Parse an email column, treating a bad value as corruption.
pub(crate) fn parse_stored_email(raw: &str) -> Result<Email, RepositoryError> {
    Email::parse(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

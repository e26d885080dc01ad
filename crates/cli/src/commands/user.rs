//! Staff account commands.
//!
//! ```bash
//! # Create the first super admin (prints a generated password)
//! hans-cli user create -e owner@hanseducation.in -n "Institute Owner" -r super_admin
//!
//! # Change or revoke a role
//! hans-cli user set-role -e staff@hanseducation.in -r viewer
//! hans-cli user set-role -e staff@hanseducation.in -r none
//!
//! # List staff
//! hans-cli user list
//! ```

use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

use hans_institute_core::{Email, Role};
use hans_institute_site::db::{RepositoryError, UserRepository};
use hans_institute_site::services::{AuthError, CreateUserRequest, UserService};

const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserCommandError {
    #[error("Missing environment variable: SITE_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer, none")]
    InvalidRole(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] hans_institute_core::EmailError),

    #[error("No user with email: {0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parse a role argument; `none` means no role.
fn parse_role(raw: &str) -> Result<Option<Role>, UserCommandError> {
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| UserCommandError::InvalidRole(raw.to_owned()))
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

async fn pool() -> Result<sqlx::PgPool, UserCommandError> {
    super::connect()
        .await?
        .ok_or(UserCommandError::MissingDatabaseUrl)
}

/// Create a staff user with an active profile.
///
/// When no password is given, a random one is generated and printed once.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is taken or the
/// database is unreachable.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: Option<String>,
) -> Result<(), UserCommandError> {
    let role = parse_role(role)?;
    let generated = password.is_none();
    let password = password.unwrap_or_else(generate_password);

    let pool = pool().await?;
    let user = UserService::new(&pool)
        .create(CreateUserRequest {
            email: email.to_owned(),
            password: password.clone(),
            full_name: name.to_owned(),
            role,
        })
        .await?;

    tracing::info!(
        "Staff user created! ID: {}, Email: {}, Role: {}",
        user.user_id,
        user.email,
        user.role.map_or("none", Role::as_str)
    );

    if generated {
        #[allow(clippy::print_stdout)]
        {
            println!("Generated password: {password}");
            println!("Share it securely; it is not stored anywhere in plain text.");
        }
    }
    Ok(())
}

/// Assign or revoke a user's role.
///
/// # Errors
///
/// Returns an error if the role or email is invalid, the user does not
/// exist, or the database is unreachable.
pub async fn set_role(email: &str, role: &str) -> Result<(), UserCommandError> {
    let role = parse_role(role)?;
    let email = Email::parse(email)?;

    let pool = pool().await?;
    let users = UserRepository::new(&pool);
    let user_id = users
        .find_id_by_email(&email)
        .await?
        .ok_or_else(|| UserCommandError::NotFound(email.to_string()))?;

    match role {
        Some(role) => users.set_role(user_id, role).await?,
        None => users.remove_role(user_id).await?,
    }

    tracing::info!(
        "Role for {} set to {}",
        email,
        role.map_or("none", Role::as_str)
    );
    Ok(())
}

/// Print every staff user with their role.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn list() -> Result<(), UserCommandError> {
    let pool = pool().await?;
    let users = UserRepository::new(&pool).list_with_roles().await?;

    #[allow(clippy::print_stdout)]
    {
        for user in &users {
            println!(
                "{}  {:<32} {:<12} {:<8} {}",
                user.user_id,
                user.email.as_str(),
                user.role.map_or("none", Role::as_str),
                if user.is_active { "active" } else { "inactive" },
                user.full_name
            );
        }
    }
    Ok(())
}

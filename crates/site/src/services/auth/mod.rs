//! Authentication service.
//!
//! Email + password login for staff. Passwords are hashed with Argon2id on
//! the blocking thread pool.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use hans_institute_core::Email;

use crate::db::UserRepository;
use crate::models::{CurrentUser, StaffAccess};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// Returns the session identity and the user's current access.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDisabled` if the profile is deactivated.
    pub async fn login_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(CurrentUser, StaffAccess), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user_id, email, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password.to_owned(), password_hash).await?;

        let access = self
            .users
            .access_for(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !access.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok((CurrentUser { id: user_id, email }, access))
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id without blocking the runtime.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

/// Verify a password against a stored hash without blocking the runtime.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match.
pub async fn verify_password(password: String, hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&password, &hash))
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

fn hash_password_blocking(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password_blocking(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_minimum() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("123456").is_ok());
    }

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("correct horse".to_owned()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(
            verify_password("correct horse".to_owned(), hash.clone())
                .await
                .is_ok()
        );
        assert!(matches!(
            verify_password("wrong horse".to_owned(), hash).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything".to_owned(), "not-a-hash".to_owned()).await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}

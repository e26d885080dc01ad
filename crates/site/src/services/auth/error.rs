//! Authentication and user-lifecycle error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication and staff account changes.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] hans_institute_core::EmailError),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account's profile has been deactivated.
    #[error("account is deactivated")]
    AccountDisabled,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required field was missing or blank.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An update request carried no fields.
    #[error("no update data provided")]
    NoUpdateData,

    /// A super admin tried to lock themselves out.
    #[error("{0}")]
    SelfModification(&'static str),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

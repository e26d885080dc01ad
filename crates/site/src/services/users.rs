//! Staff account lifecycle.
//!
//! Every operation here requires a super admin caller; the route layer
//! enforces that. This service enforces input rules and stops a super admin
//! from locking themselves out.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use hans_institute_core::{Email, Role, UserId};

use crate::db::{NewStaffUser, RepositoryError, UserRepository};
use crate::models::StaffUser;
use crate::services::auth::{AuthError, hash_password, validate_password};

/// Payload for creating a staff user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Payload for changing login credentials. At least one field is required.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Reject a super admin deleting their own account.
///
/// # Errors
///
/// Returns `AuthError::SelfModification` when `actor == target`.
pub fn guard_delete(actor: UserId, target: UserId) -> Result<(), AuthError> {
    if actor == target {
        return Err(AuthError::SelfModification("You cannot delete your own account"));
    }
    Ok(())
}

/// Reject a super admin demoting themselves or dropping their own role.
///
/// # Errors
///
/// Returns `AuthError::SelfModification` when `actor == target` and the new
/// role is anything but `super_admin`.
pub fn guard_role_change(actor: UserId, target: UserId, role: Option<Role>) -> Result<(), AuthError> {
    if actor == target && role != Some(Role::SuperAdmin) {
        return Err(AuthError::SelfModification("You cannot demote yourself"));
    }
    Ok(())
}

/// Reject a super admin deactivating themselves.
///
/// # Errors
///
/// Returns `AuthError::SelfModification` when `actor == target` and
/// `is_active` is false.
pub fn guard_status_change(actor: UserId, target: UserId, is_active: bool) -> Result<(), AuthError> {
    if actor == target && !is_active {
        return Err(AuthError::SelfModification("You cannot deactivate yourself"));
    }
    Ok(())
}

fn required(value: &str, field: &str) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

fn map_missing(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::NotFound => AuthError::UserNotFound,
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

/// Staff account management.
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Create an account, its active profile and its role in one step.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::WeakPassword` or
    /// `AuthError::InvalidInput` for bad input and
    /// `AuthError::UserAlreadyExists` if the email is taken.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create(&self, request: CreateUserRequest) -> Result<StaffUser, AuthError> {
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;
        let full_name = required(&request.full_name, "Full name")?;

        let password_hash = hash_password(request.password).await?;

        let user = self
            .users
            .create_with_profile(&NewStaffUser {
                email: &email,
                password_hash: &password_hash,
                full_name: &full_name,
                role: request.role,
            })
            .await
            .map_err(map_missing)?;

        tracing::info!(user_id = %user.user_id, role = ?user.role, "Staff user created");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `AuthError::InvalidInput` for a blank name and
    /// `AuthError::UserNotFound` if the profile does not exist.
    pub async fn update_profile(&self, user_id: UserId, full_name: &str) -> Result<StaffUser, AuthError> {
        let full_name = required(full_name, "Full name")?;
        self.users
            .update_profile(user_id, &full_name)
            .await
            .map_err(map_missing)
    }

    /// Change email and/or password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoUpdateData` if neither field is given,
    /// validation errors for bad values, `AuthError::UserNotFound` for a
    /// missing user and `AuthError::UserAlreadyExists` if the email is taken.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn update_credentials(
        &self,
        user_id: UserId,
        request: UpdateCredentialsRequest,
    ) -> Result<(), AuthError> {
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(Email::parse)
            .transpose()?;
        let password = request.password.filter(|p| !p.is_empty());

        if email.is_none() && password.is_none() {
            return Err(AuthError::NoUpdateData);
        }

        let password_hash = match password {
            Some(password) => {
                validate_password(&password)?;
                Some(hash_password(password).await?)
            }
            None => None,
        };

        self.users
            .update_credentials(user_id, email.as_ref(), password_hash.as_deref())
            .await
            .map_err(map_missing)?;

        tracing::info!(
            email_changed = email.is_some(),
            password_changed = password_hash.is_some(),
            "Credentials updated"
        );
        Ok(())
    }

    /// Assign or revoke a role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SelfModification` if the caller would demote
    /// themselves and `AuthError::UserNotFound` for a missing user.
    pub async fn set_role(&self, actor: UserId, target: UserId, role: Option<Role>) -> Result<(), AuthError> {
        guard_role_change(actor, target, role)?;
        let result = match role {
            Some(role) => self.users.set_role(target, role).await,
            None => self.users.remove_role(target).await,
        };
        result.map_err(map_missing)
    }

    /// # Errors
    ///
    /// Returns `AuthError::SelfModification` if the caller would deactivate
    /// themselves and `AuthError::UserNotFound` for a missing user.
    pub async fn set_active(&self, actor: UserId, target: UserId, is_active: bool) -> Result<(), AuthError> {
        guard_status_change(actor, target, is_active)?;
        self.users
            .set_active(target, is_active)
            .await
            .map_err(map_missing)
    }

    /// # Errors
    ///
    /// Returns `AuthError::SelfModification` if the caller targets their own
    /// account and `AuthError::UserNotFound` for a missing user.
    pub async fn delete(&self, actor: UserId, target: UserId) -> Result<(), AuthError> {
        guard_delete(actor, target)?;
        self.users.delete(target).await.map_err(map_missing)
    }
}

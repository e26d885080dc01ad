//! Authentication extractors for the admin API.
//!
//! The session only stores who is signed in. Role and active status are
//! loaded from the database on every request, so a demotion or
//! deactivation takes effect immediately.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use hans_institute_core::{Capabilities, Capability};

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentUser, StaffAccess, session_keys};
use crate::state::AppState;

/// A signed-in staff member and what they may do right now.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub user: CurrentUser,
    pub access: StaffAccess,
}

impl StaffContext {
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.access.capabilities()
    }

    /// Require one capability.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the caller's role does not grant it.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.capabilities().allows(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "You do not have permission to {capability}"
            )))
        }
    }
}

async fn current_user(parts: &Parts) -> Result<CurrentUser, AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))
}

async fn load_staff(parts: &Parts, state: &AppState) -> Result<StaffContext, AppError> {
    let user = current_user(parts).await?;

    let access = UserRepository::new(state.pool())
        .access_for(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    if !access.is_staff() {
        return Err(AppError::Forbidden(
            "You do not have access to the admin panel".to_string(),
        ));
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(StaffContext { user, access })
}

/// Extractor that requires an active user holding any staff role.
///
/// Rejects with 401 when nobody is signed in and 403 when the account is
/// deactivated or has no role.
pub struct RequireStaff(pub StaffContext);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        load_staff(parts, state).await.map(Self)
    }
}

/// Extractor that requires the `manage users` capability.
pub struct RequireSuperAdmin(pub StaffContext);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let staff = load_staff(parts, state).await?;
        if !staff.capabilities().can_manage_users {
            return Err(AppError::Forbidden(
                "Only super admins can manage users".to_string(),
            ));
        }
        Ok(Self(staff))
    }
}

/// Helper to set the current user in the session.
///
/// The session id is cycled first to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hans_institute_core::{Email, Role, UserId};

    use super::*;

    fn context(role: Option<Role>) -> StaffContext {
        let email = Email::parse("staff@hanseducation.in").unwrap();
        let id = UserId::generate();
        StaffContext {
            user: CurrentUser {
                id,
                email: email.clone(),
            },
            access: StaffAccess {
                user_id: id,
                email,
                full_name: "Staff".to_string(),
                is_active: true,
                role,
            },
        }
    }

    #[test]
    fn test_admin_can_edit_but_not_delete() {
        let admin = context(Some(Role::Admin));
        assert!(admin.require(Capability::Edit).is_ok());
        assert!(matches!(
            admin.require(Capability::Delete),
            Err(AppError::Forbidden(_))
        ));
        assert!(admin.require(Capability::ManageUsers).is_err());
    }

    #[test]
    fn test_viewer_is_read_only() {
        let viewer = context(Some(Role::Viewer));
        for capability in [Capability::Edit, Capability::Delete, Capability::ManageUsers] {
            assert!(viewer.require(capability).is_err());
        }
    }

    #[test]
    fn test_super_admin_can_do_everything() {
        let owner = context(Some(Role::SuperAdmin));
        for capability in [Capability::Edit, Capability::Delete, Capability::ManageUsers] {
            assert!(owner.require(capability).is_ok());
        }
    }

    #[test]
    fn test_forbidden_message_names_the_capability() {
        let Err(AppError::Forbidden(message)) = context(None).require(Capability::Delete) else {
            panic!("expected forbidden");
        };
        assert_eq!(message, "You do not have permission to delete");
    }
}

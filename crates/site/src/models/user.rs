//! Staff accounts and the activity log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hans_institute_core::{ActivityId, Capabilities, Email, ProfileId, Role, UserId};

/// A staff account with its profile and role, as listed in user management.
#[derive(Debug, Clone, Serialize)]
pub struct StaffUser {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub full_name: String,
    pub email: Email,
    pub is_active: bool,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a signed-in user may currently do, read fresh from the database.
#[derive(Debug, Clone, Serialize)]
pub struct StaffAccess {
    pub user_id: UserId,
    pub email: Email,
    pub full_name: String,
    pub is_active: bool,
    pub role: Option<Role>,
}

impl StaffAccess {
    /// Capabilities granted right now. Deactivated profiles get none.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        if self.is_active {
            Capabilities::for_role(self.role)
        } else {
            Capabilities::NONE
        }
    }

    /// Whether the user may enter the admin panel at all.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        self.is_active && self.role.is_some()
    }
}

/// One entry of the admin activity log.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub id: ActivityId,
    pub user_id: UserId,
    pub actor_email: Option<String>,
    pub action: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn access(role: Option<Role>, is_active: bool) -> StaffAccess {
        StaffAccess {
            user_id: UserId::generate(),
            email: Email::parse("staff@hanseducation.in").unwrap(),
            full_name: "Staff".to_owned(),
            is_active,
            role,
        }
    }

    #[test]
    fn test_active_admin_can_edit() {
        let caps = access(Some(Role::Admin), true).capabilities();
        assert!(caps.can_edit);
        assert!(!caps.can_delete);
    }

    #[test]
    fn test_deactivated_super_admin_has_nothing() {
        let user = access(Some(Role::SuperAdmin), false);
        assert_eq!(user.capabilities(), Capabilities::NONE);
        assert!(!user.is_staff());
    }

    #[test]
    fn test_roleless_user_is_not_staff() {
        assert!(!access(None, true).is_staff());
        assert!(access(Some(Role::Viewer), true).is_staff());
    }
}

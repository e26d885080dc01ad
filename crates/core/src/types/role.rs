//! Staff roles and the capabilities derived from them.
//!
//! Capabilities are never stored. Every gate in the system (HTTP extractors,
//! handlers, the CLI and the `/api/auth/me` payload) derives them from the
//! caller's role through [`Capabilities::for_role`], so UI gating and
//! server-side authorization cannot drift apart.
//!
//! | Role          | edit | delete | manage users |
//! |---------------|------|--------|--------------|
//! | `super_admin` | yes  | yes    | yes          |
//! | `admin`       | yes  | no     | no           |
//! | `viewer`      | no   | no     | no           |
//! | none          | no   | no     | no           |

use serde::{Deserialize, Serialize};

/// Staff role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "app_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access including deletes and user management.
    SuperAdmin,
    /// Can create and edit site content.
    Admin,
    /// Read-only access to the admin panel.
    Viewer,
}

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Self; 3] = [Self::SuperAdmin, Self::Admin, Self::Viewer];

    /// Stable wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }

    /// Resolve a raw, possibly missing role value.
    ///
    /// Unknown strings resolve to `None` rather than an error so callers fall
    /// through to the no-access row of the capability table.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|s| s.parse().ok())
    }

    /// Capabilities granted by this role.
    #[must_use]
    pub const fn capabilities(self) -> Capabilities {
        Capabilities::for_role(Some(self))
    }

    /// Whether this role receives inquiry notification emails.
    #[must_use]
    pub const fn receives_inquiry_alerts(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0} (expected super_admin, admin or viewer)")]
pub struct InvalidRole(pub String);

impl std::str::FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(InvalidRole(s.to_owned())),
        }
    }
}

/// A single named permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create and update content, mark inquiries read.
    Edit,
    /// Delete content and inquiries.
    Delete,
    /// List, create, update and delete staff accounts.
    ManageUsers,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit => f.write_str("edit"),
            Self::Delete => f.write_str("delete"),
            Self::ManageUsers => f.write_str("manage users"),
        }
    }
}

/// The capability booleans derived from a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_manage_users: bool,
}

impl Capabilities {
    /// No capabilities at all.
    pub const NONE: Self = Self {
        can_edit: false,
        can_delete: false,
        can_manage_users: false,
    };

    /// Derive capabilities from an optional role. A missing role fails closed.
    #[must_use]
    pub const fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::SuperAdmin) => Self {
                can_edit: true,
                can_delete: true,
                can_manage_users: true,
            },
            Some(Role::Admin) => Self {
                can_edit: true,
                can_delete: false,
                can_manage_users: false,
            },
            Some(Role::Viewer) | None => Self::NONE,
        }
    }

    /// Derive capabilities from a raw role string, failing closed on
    /// anything unrecognized.
    #[must_use]
    pub fn for_raw_role(raw: Option<&str>) -> Self {
        Self::for_role(Role::resolve(raw))
    }

    /// Check a single capability by name.
    #[must_use]
    pub const fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Edit => self.can_edit,
            Capability::Delete => self.can_delete,
            Capability::ManageUsers => self.can_manage_users,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(role.to_string(), role.as_str());
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!("owner".parse::<Role>().is_err());
        assert!("SUPER_ADMIN".parse::<Role>().is_err());
        assert_eq!(Role::resolve(Some("owner")), None);
        assert_eq!(Role::resolve(None), None);
    }

    #[test]
    fn test_super_admin_has_everything() {
        let caps = Capabilities::for_role(Some(Role::SuperAdmin));
        assert!(caps.can_edit);
        assert!(caps.can_delete);
        assert!(caps.can_manage_users);
    }

    #[test]
    fn test_admin_edits_only() {
        let caps = Role::Admin.capabilities();
        assert!(caps.can_edit);
        assert!(!caps.can_delete);
        assert!(!caps.can_manage_users);
    }

    #[test]
    fn test_viewer_and_missing_fail_closed() {
        assert_eq!(Role::Viewer.capabilities(), Capabilities::NONE);
        assert_eq!(Capabilities::for_role(None), Capabilities::NONE);
        assert_eq!(Capabilities::for_raw_role(Some("root")), Capabilities::NONE);
        assert_eq!(Capabilities::for_raw_role(Some("")), Capabilities::NONE);
    }

    #[test]
    fn test_can_edit_requires_admin_or_super_admin() {
        let raws = [
            None,
            Some("viewer"),
            Some("guest"),
            Some("Admin"),
            Some("super admin"),
        ];
        for raw in raws {
            assert!(!Capabilities::for_raw_role(raw).can_edit, "{raw:?}");
        }
    }

    #[test]
    fn test_can_delete_iff_super_admin() {
        let raws = [
            None,
            Some("admin"),
            Some("viewer"),
            Some("super_admin "),
            Some("superadmin"),
        ];
        for raw in raws {
            assert!(!Capabilities::for_raw_role(raw).can_delete, "{raw:?}");
        }
        assert!(Capabilities::for_raw_role(Some("super_admin")).can_delete);
    }

    #[test]
    fn test_allows_matches_fields() {
        for role in Role::ALL {
            let caps = role.capabilities();
            assert_eq!(caps.allows(Capability::Edit), caps.can_edit);
            assert_eq!(caps.allows(Capability::Delete), caps.can_delete);
            assert_eq!(
                caps.allows(Capability::ManageUsers),
                caps.can_manage_users
            );
        }
    }

    #[test]
    fn test_alert_recipients() {
        assert!(Role::SuperAdmin.receives_inquiry_alerts());
        assert!(Role::Admin.receives_inquiry_alerts());
        assert!(!Role::Viewer.receives_inquiry_alerts());
    }

    #[test]
    fn test_capabilities_serialize_snake_case() {
        let json = serde_json::to_value(Role::Admin.capabilities()).unwrap();
        assert_eq!(json["can_edit"], true);
        assert_eq!(json["can_delete"], false);
        assert_eq!(json["can_manage_users"], false);
    }
}

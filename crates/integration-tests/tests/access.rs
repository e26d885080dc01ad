//! Role capability table as seen by the admin API.

use hans_institute_core::{Capabilities, Capability, Role};

#[test]
fn test_capabilities_are_monotonic_in_role() {
    let ladder = [
        Capabilities::for_role(None),
        Capabilities::for_role(Some(Role::Viewer)),
        Capabilities::for_role(Some(Role::Admin)),
        Capabilities::for_role(Some(Role::SuperAdmin)),
    ];

    for capability in [Capability::Edit, Capability::Delete, Capability::ManageUsers] {
        let mut granted = false;
        for caps in ladder {
            // Once a role grants a capability, every higher role does too.
            assert!(!granted || caps.allows(capability));
            granted = caps.allows(capability);
        }
        assert!(granted, "super admin must hold {capability}");
    }
}

#[test]
fn test_unknown_role_strings_fail_closed() {
    for raw in [None, Some(""), Some("owner"), Some("SUPER ADMIN"), Some("root")] {
        assert_eq!(Capabilities::for_raw_role(raw), Capabilities::NONE);
    }
}

#[test]
fn test_only_super_admin_manages_users() {
    for role in [Role::Viewer, Role::Admin] {
        assert!(!Capabilities::for_role(Some(role)).can_manage_users);
    }
    assert!(Capabilities::for_role(Some(Role::SuperAdmin)).can_manage_users);
}

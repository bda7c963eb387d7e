//! Role and permission model tests
//!
//! Covers the declarative seed data, capability resolution across
//! multiple roles, and the deletion guards for system roles and roles
//! with assigned users.

use proptest::prelude::*;
use shared::models::{Permission, RoleFlags, SEED_ADMIN, SEED_ROLES};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_eleven_permissions() {
        assert_eq!(Permission::ALL.len(), 11);
    }

    #[test]
    fn test_permission_strings_are_snake_case() {
        for p in Permission::ALL {
            let s = p.as_str();
            assert!(s.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
            assert_eq!(Permission::parse(s), Some(p));
        }
    }

    #[test]
    fn test_seed_roles_cover_expected_names() {
        let names: Vec<&str> = SEED_ROLES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["SuperAdmin", "Admin", "Manager", "Sales", "Viewer", "User"]
        );
    }

    #[test]
    fn test_super_admin_has_every_capability() {
        let seed = SEED_ROLES.iter().find(|r| r.name == "SuperAdmin").unwrap();
        let flags = RoleFlags::from_permissions(seed.permissions);
        for p in Permission::ALL {
            assert!(flags.grants(p), "SuperAdmin missing {}", p);
        }
    }

    #[test]
    fn test_admin_lacks_settings_only() {
        let seed = SEED_ROLES.iter().find(|r| r.name == "Admin").unwrap();
        let flags = RoleFlags::from_permissions(seed.permissions);
        assert!(!flags.grants(Permission::ManageSettings));
        for p in Permission::ALL {
            if p != Permission::ManageSettings {
                assert!(flags.grants(p), "Admin missing {}", p);
            }
        }
    }

    #[test]
    fn test_viewer_can_only_view_reports() {
        let seed = SEED_ROLES.iter().find(|r| r.name == "Viewer").unwrap();
        let flags = RoleFlags::from_permissions(seed.permissions);
        assert!(flags.grants(Permission::ViewReports));
        assert_eq!(flags.permission_strings(), vec!["view_reports"]);
    }

    #[test]
    fn test_basic_user_role_grants_nothing() {
        let seed = SEED_ROLES.iter().find(|r| r.name == "User").unwrap();
        let flags = RoleFlags::from_permissions(seed.permissions);
        assert!(flags.permission_strings().is_empty());
    }

    #[test]
    fn test_system_role_protection_set() {
        // SuperAdmin, Admin and User can never be edited or deleted
        for seed in SEED_ROLES.iter() {
            let expected = matches!(seed.name, "SuperAdmin" | "Admin" | "User");
            assert_eq!(seed.is_system_role, expected, "{}", seed.name);
        }
    }

    #[test]
    fn test_seed_admin_is_super_admin() {
        assert_eq!(SEED_ADMIN.role, "SuperAdmin");
        assert!(SEED_ADMIN.email.contains('@'));
    }

    #[test]
    fn test_sales_role_scope() {
        let seed = SEED_ROLES.iter().find(|r| r.name == "Sales").unwrap();
        let flags = RoleFlags::from_permissions(seed.permissions);
        assert!(flags.grants(Permission::ManageCustomers));
        assert!(flags.grants(Permission::ManageOrders));
        assert!(flags.grants(Permission::ViewReports));
        assert!(!flags.grants(Permission::ManageProducts));
        assert!(!flags.grants(Permission::ManageUsers));
        assert!(!flags.grants(Permission::ManageInventory));
    }

    /// Deletion guard logic: system roles always rejected, otherwise a
    /// role with users is rejected.
    fn can_delete(is_system_role: bool, user_count: i64) -> bool {
        !is_system_role && user_count == 0
    }

    #[test]
    fn test_delete_guards() {
        assert!(!can_delete(true, 0));
        assert!(!can_delete(true, 5));
        assert!(!can_delete(false, 3));
        assert!(can_delete(false, 0));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn permission_strategy() -> impl Strategy<Value = Permission> {
        (0usize..Permission::ALL.len()).prop_map(|i| Permission::ALL[i])
    }

    fn permission_set_strategy() -> impl Strategy<Value = Vec<Permission>> {
        prop::collection::vec(permission_strategy(), 0..11)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A flag set grants exactly the permissions it was built from.
        #[test]
        fn prop_flags_reflect_permission_set(perms in permission_set_strategy()) {
            let flags = RoleFlags::from_permissions(&perms);
            for p in Permission::ALL {
                prop_assert_eq!(flags.grants(p), perms.contains(&p));
            }
        }

        /// Union grants a permission iff one of the operands does.
        #[test]
        fn prop_union_is_or(
            a in permission_set_strategy(),
            b in permission_set_strategy()
        ) {
            let merged = RoleFlags::from_permissions(&a).union(&RoleFlags::from_permissions(&b));
            for p in Permission::ALL {
                prop_assert_eq!(merged.grants(p), a.contains(&p) || b.contains(&p));
            }
        }

        /// Union is commutative and idempotent.
        #[test]
        fn prop_union_laws(
            a in permission_set_strategy(),
            b in permission_set_strategy()
        ) {
            let fa = RoleFlags::from_permissions(&a);
            let fb = RoleFlags::from_permissions(&b);
            prop_assert_eq!(fa.union(&fb), fb.union(&fa));
            prop_assert_eq!(fa.union(&fa), fa);
        }

        /// The permission strings round-trip through parse, so claims
        /// written at login always resolve at authorization time.
        #[test]
        fn prop_permission_strings_resolve(perms in permission_set_strategy()) {
            let flags = RoleFlags::from_permissions(&perms);
            let parsed: Vec<Permission> = flags
                .permission_strings()
                .iter()
                .filter_map(|s| Permission::parse(s))
                .collect();
            prop_assert_eq!(RoleFlags::from_permissions(&parsed), flags);
        }
    }
}

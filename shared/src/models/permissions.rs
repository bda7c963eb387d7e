//! Capability-based permission model and declarative role seed data
//!
//! A role is a flat set of capabilities. Authorization checks consult
//! the resolved capability set of the caller's roles, never role names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eleven capabilities a role can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageUsers,
    ManageRoles,
    ManageProducts,
    ManageCategories,
    ManageBrands,
    ManageCustomers,
    ManageOrders,
    ManageSuppliers,
    ManageInventory,
    ViewReports,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ManageProducts,
        Permission::ManageCategories,
        Permission::ManageBrands,
        Permission::ManageCustomers,
        Permission::ManageOrders,
        Permission::ManageSuppliers,
        Permission::ManageInventory,
        Permission::ViewReports,
        Permission::ManageSettings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ManageRoles => "manage_roles",
            Permission::ManageProducts => "manage_products",
            Permission::ManageCategories => "manage_categories",
            Permission::ManageBrands => "manage_brands",
            Permission::ManageCustomers => "manage_customers",
            Permission::ManageOrders => "manage_orders",
            Permission::ManageSuppliers => "manage_suppliers",
            Permission::ManageInventory => "manage_inventory",
            Permission::ViewReports => "view_reports",
            Permission::ManageSettings => "manage_settings",
        }
    }

    pub fn parse(value: &str) -> Option<Permission> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability flags stored on a role row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags {
    pub can_manage_users: bool,
    pub can_manage_roles: bool,
    pub can_manage_products: bool,
    pub can_manage_categories: bool,
    pub can_manage_brands: bool,
    pub can_manage_customers: bool,
    pub can_manage_orders: bool,
    pub can_manage_suppliers: bool,
    pub can_manage_inventory: bool,
    pub can_view_reports: bool,
    pub can_manage_settings: bool,
}

impl RoleFlags {
    pub fn all() -> Self {
        Self::from_permissions(&Permission::ALL)
    }

    pub fn from_permissions(perms: &[Permission]) -> Self {
        let mut flags = RoleFlags::default();
        for p in perms {
            flags.grant(*p);
        }
        flags
    }

    pub fn grant(&mut self, permission: Permission) {
        match permission {
            Permission::ManageUsers => self.can_manage_users = true,
            Permission::ManageRoles => self.can_manage_roles = true,
            Permission::ManageProducts => self.can_manage_products = true,
            Permission::ManageCategories => self.can_manage_categories = true,
            Permission::ManageBrands => self.can_manage_brands = true,
            Permission::ManageCustomers => self.can_manage_customers = true,
            Permission::ManageOrders => self.can_manage_orders = true,
            Permission::ManageSuppliers => self.can_manage_suppliers = true,
            Permission::ManageInventory => self.can_manage_inventory = true,
            Permission::ViewReports => self.can_view_reports = true,
            Permission::ManageSettings => self.can_manage_settings = true,
        }
    }

    pub fn grants(&self, permission: Permission) -> bool {
        match permission {
            Permission::ManageUsers => self.can_manage_users,
            Permission::ManageRoles => self.can_manage_roles,
            Permission::ManageProducts => self.can_manage_products,
            Permission::ManageCategories => self.can_manage_categories,
            Permission::ManageBrands => self.can_manage_brands,
            Permission::ManageCustomers => self.can_manage_customers,
            Permission::ManageOrders => self.can_manage_orders,
            Permission::ManageSuppliers => self.can_manage_suppliers,
            Permission::ManageInventory => self.can_manage_inventory,
            Permission::ViewReports => self.can_view_reports,
            Permission::ManageSettings => self.can_manage_settings,
        }
    }

    /// Granted capabilities as the strings carried in JWT claims
    pub fn permission_strings(&self) -> Vec<String> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.grants(*p))
            .map(|p| p.as_str().to_string())
            .collect()
    }

    /// Union of two flag sets; used to resolve a user's capabilities
    /// across all assigned roles.
    pub fn union(&self, other: &RoleFlags) -> RoleFlags {
        let mut flags = *self;
        for p in Permission::ALL {
            if other.grants(p) {
                flags.grant(p);
            }
        }
        flags
    }
}

/// A role created at first startup
#[derive(Debug, Clone, Copy)]
pub struct RoleSeed {
    pub name: &'static str,
    pub description: &'static str,
    pub is_system_role: bool,
    pub permissions: &'static [Permission],
}

/// Roles seeded once at process start. SuperAdmin, Admin and User are
/// system roles: they can never be edited or deleted.
pub const SEED_ROLES: [RoleSeed; 6] = [
    RoleSeed {
        name: "SuperAdmin",
        description: "Full system administrator with all permissions",
        is_system_role: true,
        permissions: &Permission::ALL,
    },
    RoleSeed {
        name: "Admin",
        description: "Administrator with management permissions",
        is_system_role: true,
        permissions: &[
            Permission::ManageUsers,
            Permission::ManageRoles,
            Permission::ManageProducts,
            Permission::ManageCategories,
            Permission::ManageBrands,
            Permission::ManageCustomers,
            Permission::ManageOrders,
            Permission::ManageSuppliers,
            Permission::ManageInventory,
            Permission::ViewReports,
        ],
    },
    RoleSeed {
        name: "Manager",
        description: "Store manager with operational permissions",
        is_system_role: false,
        permissions: &[
            Permission::ManageProducts,
            Permission::ManageCategories,
            Permission::ManageBrands,
            Permission::ManageCustomers,
            Permission::ManageOrders,
            Permission::ManageSuppliers,
            Permission::ManageInventory,
            Permission::ViewReports,
        ],
    },
    RoleSeed {
        name: "Sales",
        description: "Sales staff with customer and order permissions",
        is_system_role: false,
        permissions: &[
            Permission::ManageCustomers,
            Permission::ManageOrders,
            Permission::ViewReports,
        ],
    },
    RoleSeed {
        name: "Viewer",
        description: "View-only role with minimal permissions",
        is_system_role: false,
        permissions: &[Permission::ViewReports],
    },
    RoleSeed {
        name: "User",
        description: "Basic user role for new registrations",
        is_system_role: true,
        permissions: &[],
    },
];

/// Role assigned to self-registered accounts
pub const DEFAULT_REGISTRATION_ROLE: &str = "User";

/// Default administrator account created alongside the seed roles
pub struct AdminSeed {
    pub email: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub role: &'static str,
}

pub const SEED_ADMIN: AdminSeed = AdminSeed {
    email: "admin@storedashboard.com",
    username: "admin",
    password: "Admin@Store123",
    first_name: "System",
    last_name: "Administrator",
    role: "SuperAdmin",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_strings_round_trip() {
        for p in Permission::ALL {
            assert_eq!(Permission::parse(p.as_str()), Some(p));
        }
    }

    #[test]
    fn super_admin_seed_grants_everything() {
        let seed = SEED_ROLES.iter().find(|r| r.name == "SuperAdmin").unwrap();
        let flags = RoleFlags::from_permissions(seed.permissions);
        assert_eq!(flags, RoleFlags::all());
    }

    #[test]
    fn system_roles_are_exactly_the_protected_three() {
        let protected: Vec<&str> = SEED_ROLES
            .iter()
            .filter(|r| r.is_system_role)
            .map(|r| r.name)
            .collect();
        assert_eq!(protected, vec!["SuperAdmin", "Admin", "User"]);
    }

    #[test]
    fn union_merges_capability_sets() {
        let sales = RoleFlags::from_permissions(&[
            Permission::ManageCustomers,
            Permission::ManageOrders,
        ]);
        let viewer = RoleFlags::from_permissions(&[Permission::ViewReports]);
        let merged = sales.union(&viewer);
        assert!(merged.grants(Permission::ManageCustomers));
        assert!(merged.grants(Permission::ViewReports));
        assert!(!merged.grants(Permission::ManageUsers));
    }
}

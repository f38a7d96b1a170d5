use salesdesk_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::security::{PermissionCode, PermissionDefinition};

/// Permissions the permission core checks for its own administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPermission {
    /// Allows listing groups and their bundles.
    GroupView,
    /// Allows creating tenant groups.
    GroupCreate,
    /// Allows attaching and detaching group permissions.
    GroupUpdate,
    /// Allows deleting tenant groups.
    GroupDelete,
    /// Allows adding users to groups.
    UserAssignmentCreate,
    /// Allows removing users from groups.
    UserAssignmentDelete,
    /// Allows reading the catalog and other users' grants.
    PermissionView,
    /// Allows granting permissions directly to users.
    PermissionGrant,
    /// Allows revoking direct permission grants.
    PermissionRevoke,
}

impl AdminPermission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GroupView => "group.view",
            Self::GroupCreate => "group.create",
            Self::GroupUpdate => "group.update",
            Self::GroupDelete => "group.delete",
            Self::UserAssignmentCreate => "user_assignment.create",
            Self::UserAssignmentDelete => "user_assignment.delete",
            Self::PermissionView => "permission.view",
            Self::PermissionGrant => "permission.grant",
            Self::PermissionRevoke => "permission.revoke",
        }
    }

    /// Returns the catalog code for this permission.
    #[must_use]
    pub fn code(&self) -> PermissionCode {
        PermissionCode::from_static(self.as_str())
    }

    /// Returns all administrative permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AdminPermission] = &[
            AdminPermission::GroupView,
            AdminPermission::GroupCreate,
            AdminPermission::GroupUpdate,
            AdminPermission::GroupDelete,
            AdminPermission::UserAssignmentCreate,
            AdminPermission::UserAssignmentDelete,
            AdminPermission::PermissionView,
            AdminPermission::PermissionGrant,
            AdminPermission::PermissionRevoke,
        ];

        ALL
    }
}

struct CatalogEntry {
    code: &'static str,
    name: &'static str,
    description: &'static str,
}

const fn entry(code: &'static str, name: &'static str, description: &'static str) -> CatalogEntry {
    CatalogEntry {
        code,
        name,
        description,
    }
}

const CATALOG: &[CatalogEntry] = &[
    entry("branch.view", "View branches", "Read branch information"),
    entry("branch.create", "Create branches", "Create new branches"),
    entry("branch.update", "Update branches", "Edit branch information"),
    entry("branch.delete", "Delete branches", "Delete branches"),
    entry("company.view", "View company", "Read company information"),
    entry("company.update", "Update company", "Edit company information"),
    entry("customer.view", "View customers", "Read customer information"),
    entry("customer.create", "Create customers", "Create new customers"),
    entry("customer.update", "Update customers", "Edit customer information"),
    entry("customer.delete", "Delete customers", "Delete customers"),
    entry("department.view", "View departments", "Read department information"),
    entry("department.create", "Create departments", "Create new departments"),
    entry("department.update", "Update departments", "Edit department information"),
    entry("department.delete", "Delete departments", "Delete departments"),
    entry("report.view_all", "View all reports", "Read every daily report in the company"),
    entry("report.view_self", "View own reports", "Read only your own daily reports"),
    entry("report.create", "Create reports", "Write daily reports"),
    entry("report.update_self", "Update own reports", "Edit only your own daily reports"),
    entry("report.delete_self", "Delete own reports", "Delete only your own daily reports"),
    entry("report.approve", "Approve reports", "Approve submitted daily reports"),
    entry("service.view", "View services", "Read service information"),
    entry("service.create", "Create services", "Create new services"),
    entry("service.update", "Update services", "Edit service information"),
    entry("service.delete", "Delete services", "Delete services"),
    entry("subscription.view", "View subscriptions", "Read subscription information"),
    entry("subscription.create", "Create subscriptions", "Subscribe to services"),
    entry("subscription.update", "Update subscriptions", "Edit subscriptions"),
    entry("subscription.delete", "Delete subscriptions", "Cancel subscriptions"),
    entry("user.view", "View users", "Read user information"),
    entry("user.create", "Create users", "Create new users"),
    entry("user.update", "Update users", "Edit user information"),
    entry("user.update_self", "Update own profile", "Edit only your own user information"),
    entry("user.delete", "Delete users", "Delete users"),
    entry("user_assignment.view", "View group memberships", "Read group memberships"),
    entry("user_assignment.create", "Add group members", "Add users to groups"),
    entry("user_assignment.delete", "Remove group members", "Remove users from groups"),
    entry("group.view", "View groups", "Read groups and their permissions"),
    entry("group.create", "Create groups", "Create company groups"),
    entry("group.update", "Update groups", "Attach and detach group permissions"),
    entry("group.delete", "Delete groups", "Delete company groups"),
    entry("permission.view", "View permissions", "Read the catalog and user grants"),
    entry("permission.grant", "Grant permissions", "Grant permissions directly to users"),
    entry("permission.revoke", "Revoke permissions", "Revoke direct permission grants"),
];

/// Returns the static permission catalog seeded at system setup.
pub fn permission_catalog() -> AppResult<Vec<PermissionDefinition>> {
    CATALOG
        .iter()
        .map(|entry| {
            let code = PermissionCode::new(entry.code)?;
            Ok(PermissionDefinition {
                resource_type: code.resource_type().to_owned(),
                code,
                name: entry.name.to_owned(),
                description: Some(entry.description.to_owned()),
            })
        })
        .collect()
}

/// Permissions bundled into one seeded system group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedBundle {
    /// Every catalog permission.
    Everything,
    /// An explicit list of catalog codes.
    Codes(Vec<PermissionCode>),
}

/// System group created at setup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemGroupSeed {
    /// Unique group code.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Group description.
    pub description: &'static str,
    /// Permissions attached to the group.
    pub bundle: SeedBundle,
}

impl SystemGroupSeed {
    /// Expands the bundle against the catalog.
    #[must_use]
    pub fn permission_codes(&self, catalog: &[PermissionDefinition]) -> Vec<PermissionCode> {
        match &self.bundle {
            SeedBundle::Everything => catalog
                .iter()
                .map(|definition| definition.code.clone())
                .collect(),
            SeedBundle::Codes(codes) => codes.clone(),
        }
    }
}

const MANAGER_CODES: &[&str] = &[
    "branch.view",
    "branch.create",
    "branch.update",
    "company.view",
    "customer.view",
    "customer.create",
    "customer.update",
    "department.view",
    "department.create",
    "department.update",
    "report.view_all",
    "report.create",
    "report.update_self",
    "report.approve",
    "service.view",
    "subscription.view",
    "subscription.create",
    "subscription.update",
    "user.view",
    "user.create",
    "user.update",
    "user.update_self",
    "user_assignment.view",
    "user_assignment.create",
    "user_assignment.delete",
    "group.view",
];

const STAFF_CODES: &[&str] = &[
    "branch.view",
    "company.view",
    "customer.view",
    "customer.create",
    "customer.update",
    "department.view",
    "report.view_self",
    "report.create",
    "report.update_self",
    "report.delete_self",
    "service.view",
    "subscription.view",
    "user.view",
    "user.update_self",
];

const VIEWER_CODES: &[&str] = &[
    "branch.view",
    "company.view",
    "customer.view",
    "department.view",
    "report.view_self",
    "service.view",
    "subscription.view",
    "user.view",
];

fn codes(values: &[&str]) -> AppResult<SeedBundle> {
    values
        .iter()
        .map(|value| PermissionCode::new(*value))
        .collect::<AppResult<Vec<_>>>()
        .map(SeedBundle::Codes)
}

/// Returns the system-wide groups seeded at setup time.
pub fn system_group_seeds() -> AppResult<Vec<SystemGroupSeed>> {
    Ok(vec![
        SystemGroupSeed {
            code: "admin",
            name: "Administrators",
            description: "Company administrators holding every permission",
            bundle: SeedBundle::Everything,
        },
        SystemGroupSeed {
            code: "manager",
            name: "Managers",
            description: "Department managers who maintain company data",
            bundle: codes(MANAGER_CODES)?,
        },
        SystemGroupSeed {
            code: "staff",
            name: "Staff",
            description: "Regular staff working on their own data",
            bundle: codes(STAFF_CODES)?,
        },
        SystemGroupSeed {
            code: "viewer",
            name: "Viewers",
            description: "Read-only access",
            bundle: codes(VIEWER_CODES)?,
        },
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{AdminPermission, permission_catalog, system_group_seeds};
    use crate::PermissionCode;

    #[test]
    fn catalog_codes_are_valid_and_unique() {
        let catalog = permission_catalog();
        assert!(catalog.is_ok());
        let catalog = catalog.unwrap_or_default();

        let codes: HashSet<_> = catalog.iter().map(|entry| entry.code.clone()).collect();
        assert_eq!(codes.len(), catalog.len());
        assert!(
            catalog
                .iter()
                .all(|entry| entry.code.resource_type() == entry.resource_type)
        );
    }

    #[test]
    fn admin_permissions_are_part_of_the_catalog() {
        let catalog = permission_catalog().unwrap_or_default();

        for permission in AdminPermission::all() {
            assert!(PermissionCode::new(permission.as_str()).is_ok());
            assert!(
                catalog
                    .iter()
                    .any(|entry| entry.code.as_str() == permission.as_str()),
                "{} missing from catalog",
                permission.as_str()
            );
        }
    }

    #[test]
    fn system_group_bundles_reference_catalog_codes() {
        let catalog = permission_catalog().unwrap_or_default();
        let seeds = system_group_seeds();
        assert!(seeds.is_ok());

        for seed in seeds.unwrap_or_default() {
            for code in seed.permission_codes(&catalog) {
                assert!(
                    catalog.iter().any(|entry| entry.code == code),
                    "group '{}' references unknown code '{code}'",
                    seed.code
                );
            }
        }
    }

    #[test]
    fn admin_group_expands_to_the_whole_catalog() {
        let catalog = permission_catalog().unwrap_or_default();
        let seeds = system_group_seeds().unwrap_or_default();
        let admin = seeds.iter().find(|seed| seed.code == "admin");
        assert!(admin.is_some());
        assert_eq!(
            admin
                .map(|seed| seed.permission_codes(&catalog).len())
                .unwrap_or_default(),
            catalog.len()
        );
    }
}

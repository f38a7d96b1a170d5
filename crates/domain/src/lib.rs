//! Domain entities and invariants of the permission core.

#![forbid(unsafe_code)]

mod access;
mod catalog;
mod group;
mod security;

pub use access::{EffectivePermissions, PermissionRequirement, RequirementMode};
pub use catalog::{
    AdminPermission, SeedBundle, SystemGroupSeed, permission_catalog, system_group_seeds,
};
pub use group::{GroupCode, GroupOwnership};
pub use security::{AuditAction, AuditResource, PermissionCode, PermissionDefinition};

//! Application services and ports of the permission core.

#![forbid(unsafe_code)]

mod audit_ports;
mod authorization_ports;
mod authorization_service;
mod permission_admin_ports;
mod permission_admin_service;
mod user_directory;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_ports::{
    AuthorizationRepository, DirectPermissionGrant, GroupPermissionGrant, PermissionGrantDetails,
    PermissionSources,
};
pub use authorization_service::{
    AccessDecision, AuthorizationService, Denial, DirectGrantSource, GroupSource,
    PermissionProvenance,
};
pub use permission_admin_ports::{
    CreateGroupInput, DirectGrantAudit, GrantPermissionsInput, GroupDefinition, GroupMembership,
    NewGroup, PermissionAdminRepository, UserAccessSummary,
};
pub use permission_admin_service::PermissionAdminService;
pub use user_directory::UserDirectory;

use salesdesk_core::GroupId;
use salesdesk_domain::{GroupCode, GroupOwnership, PermissionCode};

/// Group definition returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDefinition {
    /// Stable group identifier.
    pub group_id: GroupId,
    /// Unique group code.
    pub code: GroupCode,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// System-wide or tenant-owned.
    pub ownership: GroupOwnership,
    /// Permissions attached to the group, ordered by code.
    pub permissions: Vec<PermissionCode>,
}

/// Input payload for creating tenant groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateGroupInput {
    /// Unique group code.
    pub code: GroupCode,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Permissions to attach in the same transaction.
    pub permissions: Vec<PermissionCode>,
}

/// Group persisted by the repository, ownership resolved by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    /// Group ownership.
    pub ownership: GroupOwnership,
    /// Unique group code.
    pub code: GroupCode,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Permissions to attach atomically.
    pub permissions: Vec<PermissionCode>,
}

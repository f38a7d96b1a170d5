use chrono::{DateTime, Utc};
use salesdesk_core::UserId;

use salesdesk_domain::PermissionCode;

use crate::PermissionProvenance;

use super::groups::GroupDefinition;

/// Input payload for granting permissions directly to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantPermissionsInput {
    /// Permissions to grant; the batch is applied atomically.
    pub permissions: Vec<PermissionCode>,
    /// Optional reason recorded on every grant.
    pub reason: Option<String>,
}

/// Audit fields stamped on direct grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectGrantAudit {
    /// Administrator performing the grant.
    pub granted_by: UserId,
    /// Optional reason.
    pub reason: Option<String>,
}

/// A user's membership in one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    /// The group.
    pub group: GroupDefinition,
    /// Administrator that added the user, if still known.
    pub assigned_by: Option<UserId>,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Administrative view of one user's assignments and effective permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccessSummary {
    /// Inspected user.
    pub user_id: UserId,
    /// Group memberships ordered by group code.
    pub memberships: Vec<GroupMembership>,
    /// Effective permissions with provenance.
    pub permissions: Vec<PermissionProvenance>,
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use salesdesk_core::{AppResult, GroupId, UserId};
use salesdesk_domain::{GroupCode, PermissionCode, PermissionDefinition};

/// Raw permission codes of both grant paths, read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSources {
    /// Codes granted directly to the user.
    pub direct: Vec<PermissionCode>,
    /// Codes reachable through the user's groups; may repeat across groups.
    pub via_groups: Vec<PermissionCode>,
}

/// Direct grant row with its audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectPermissionGrant {
    /// Granted permission.
    pub permission: PermissionDefinition,
    /// Administrator that granted the permission, if still known.
    pub granted_by: Option<UserId>,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
    /// Optional free-text reason.
    pub reason: Option<String>,
}

/// Permission reached through one group membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPermissionGrant {
    /// Permission attached to the group.
    pub permission: PermissionDefinition,
    /// Group identifier.
    pub group_id: GroupId,
    /// Group code.
    pub group_code: GroupCode,
    /// Group display name.
    pub group_name: String,
}

/// Detailed grant rows of both paths, read from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionGrantDetails {
    /// Direct grants.
    pub direct: Vec<DirectPermissionGrant>,
    /// Group-derived grants, one row per (group, permission).
    pub via_groups: Vec<GroupPermissionGrant>,
}

/// Repository port for permission lookups.
///
/// Implementations must read both grant paths from one consistent snapshot and
/// return empty sources for unknown users.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Loads the permission codes of both grant paths.
    async fn load_permission_sources(&self, user_id: UserId) -> AppResult<PermissionSources>;

    /// Loads detailed grant rows of both paths for provenance display.
    async fn load_grant_details(&self, user_id: UserId) -> AppResult<PermissionGrantDetails>;
}

use async_trait::async_trait;

use salesdesk_core::{AppResult, GroupId, TenantId, UserId};
use salesdesk_domain::{PermissionCode, PermissionDefinition};

use super::grants::{DirectGrantAudit, GroupMembership};
use super::groups::{GroupDefinition, NewGroup};

/// Repository port for permission, group, and assignment administration.
///
/// Pair uniqueness is enforced by the store: inserting an existing
/// `(group, permission)`, `(user, group)` or `(user, permission)` pair fails
/// with `Conflict` and leaves the store unchanged. Batch inserts are atomic.
/// Unknown permission codes fail with `NotFound`.
#[async_trait]
pub trait PermissionAdminRepository: Send + Sync {
    /// Lists the permission catalog ordered by code.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>>;

    /// Finds a catalog entry by code.
    async fn find_permission(
        &self,
        permission: &PermissionCode,
    ) -> AppResult<Option<PermissionDefinition>>;

    /// Lists system groups and groups owned by the tenant.
    async fn list_groups(&self, tenant_id: TenantId) -> AppResult<Vec<GroupDefinition>>;

    /// Finds a group by identifier.
    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>>;

    /// Creates a group and attaches its permissions in one transaction.
    async fn create_group(&self, group: NewGroup) -> AppResult<GroupDefinition>;

    /// Deletes a group together with its grants and memberships.
    async fn delete_group(&self, group_id: GroupId) -> AppResult<()>;

    /// Attaches permissions to a group in one transaction.
    async fn attach_group_permissions(
        &self,
        group_id: GroupId,
        permissions: &[PermissionCode],
    ) -> AppResult<()>;

    /// Detaches a permission; returns whether a row was removed.
    async fn detach_group_permission(
        &self,
        group_id: GroupId,
        permission: &PermissionCode,
    ) -> AppResult<bool>;

    /// Adds a user to a group.
    async fn add_group_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> AppResult<()>;

    /// Removes a user from a group; returns whether a row was removed.
    async fn remove_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<bool>;

    /// Lists a user's group memberships.
    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<GroupMembership>>;

    /// Grants permissions directly to a user in one transaction.
    async fn grant_user_permissions(
        &self,
        user_id: UserId,
        permissions: &[PermissionCode],
        audit: DirectGrantAudit,
    ) -> AppResult<()>;

    /// Revokes a direct grant; returns whether a row was removed.
    async fn revoke_user_permission(
        &self,
        user_id: UserId,
        permission: &PermissionCode,
    ) -> AppResult<bool>;
}

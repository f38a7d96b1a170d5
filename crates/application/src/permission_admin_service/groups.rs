use salesdesk_core::NonEmptyString;
use salesdesk_domain::GroupOwnership;

use crate::permission_admin_ports::{CreateGroupInput, NewGroup};

use super::*;

impl PermissionAdminService {
    /// Lists system groups and the actor's tenant groups.
    pub async fn list_groups(&self, actor: &AuthenticatedUser) -> AppResult<Vec<GroupDefinition>> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::GroupView)
            .await?;

        self.repository.list_groups(actor.tenant_id()).await
    }

    /// Returns one group visible to the actor.
    pub async fn get_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
    ) -> AppResult<GroupDefinition> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::GroupView)
            .await?;

        self.visible_group(actor, group_id).await
    }

    /// Creates a tenant group with its initial permissions.
    pub async fn create_group(
        &self,
        actor: &AuthenticatedUser,
        input: CreateGroupInput,
    ) -> AppResult<GroupDefinition> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::GroupCreate)
            .await?;

        let name = NonEmptyString::new(input.name.trim())?;
        let mut permissions = input.permissions;
        permissions.sort();
        permissions.dedup();
        self.require_catalog_permissions(&permissions).await?;
        self.require_delegable(actor, &permissions).await?;

        let group = self
            .repository
            .create_group(NewGroup {
                ownership: GroupOwnership::Tenant(actor.tenant_id()),
                code: input.code,
                name: name.into(),
                description: input
                    .description
                    .map(|value| value.trim().to_owned())
                    .filter(|value| !value.is_empty()),
                permissions,
            })
            .await?;

        self.append_audit_event(
            actor,
            AuditAction::GroupCreated,
            AuditResource::PermissionGroup,
            group.group_id.to_string(),
            format!(
                "created group '{}' with permissions [{}]",
                group.code,
                join_codes(&group.permissions)
            ),
        )
        .await?;

        Ok(group)
    }

    /// Deletes a tenant group; its memberships and grants go with it.
    pub async fn delete_group(&self, actor: &AuthenticatedUser, group_id: GroupId) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::GroupDelete)
            .await?;

        let group = self.editable_group(actor, group_id).await?;
        self.repository.delete_group(group_id).await?;

        self.append_audit_event(
            actor,
            AuditAction::GroupDeleted,
            AuditResource::PermissionGroup,
            group_id.to_string(),
            format!("deleted group '{}'", group.code),
        )
        .await
    }

    /// Attaches permissions to a tenant group atomically.
    ///
    /// Every member's effective set changes on their next request.
    pub async fn attach_permissions_to_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
        permissions: Vec<PermissionCode>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::GroupUpdate)
            .await?;

        let permissions = normalized_batch(permissions)?;
        let group = self.editable_group(actor, group_id).await?;
        self.require_catalog_permissions(&permissions).await?;
        self.require_delegable(actor, &permissions).await?;
        self.repository
            .attach_group_permissions(group_id, &permissions)
            .await?;

        self.append_audit_event(
            actor,
            AuditAction::GroupPermissionAttached,
            AuditResource::GroupPermission,
            group_id.to_string(),
            format!(
                "attached [{}] to group '{}'",
                join_codes(&permissions),
                group.code
            ),
        )
        .await
    }

    /// Attaches one permission to a tenant group.
    pub async fn attach_permission_to_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
        permission: PermissionCode,
    ) -> AppResult<()> {
        self.attach_permissions_to_group(actor, group_id, vec![permission])
            .await
    }

    /// Detaches a permission from a tenant group; absent pairs are a no-op.
    pub async fn detach_permission_from_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
        permission: &PermissionCode,
    ) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::GroupUpdate)
            .await?;

        let group = self.editable_group(actor, group_id).await?;
        self.require_catalog_permissions(std::slice::from_ref(permission))
            .await?;
        let removed = self
            .repository
            .detach_group_permission(group_id, permission)
            .await?;

        if !removed {
            return Ok(());
        }

        self.append_audit_event(
            actor,
            AuditAction::GroupPermissionDetached,
            AuditResource::GroupPermission,
            format!("{group_id}:{permission}"),
            format!("detached '{permission}' from group '{}'", group.code),
        )
        .await
    }

    /// Adds a user of the actor's tenant to a visible group.
    ///
    /// The actor must hold every permission of the group's bundle.
    pub async fn add_user_to_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::UserAssignmentCreate)
            .await?;

        let group = self.visible_group(actor, group_id).await?;
        self.tenant_user(actor, user_id).await?;
        self.require_delegable(actor, &group.permissions).await?;
        self.repository
            .add_group_member(group_id, user_id, actor.user_id())
            .await?;

        self.append_audit_event(
            actor,
            AuditAction::GroupMemberAdded,
            AuditResource::UserGroupAssignment,
            format!("{user_id}:{group_id}"),
            format!("added user '{user_id}' to group '{}'", group.code),
        )
        .await
    }

    /// Removes a user from a group; absent memberships are a no-op.
    pub async fn remove_user_from_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::UserAssignmentDelete)
            .await?;

        let group = self.visible_group(actor, group_id).await?;
        self.tenant_user(actor, user_id).await?;
        let removed = self.repository.remove_group_member(group_id, user_id).await?;

        if !removed {
            return Ok(());
        }

        self.append_audit_event(
            actor,
            AuditAction::GroupMemberRemoved,
            AuditResource::UserGroupAssignment,
            format!("{user_id}:{group_id}"),
            format!("removed user '{user_id}' from group '{}'", group.code),
        )
        .await
    }
}

use crate::permission_admin_ports::{DirectGrantAudit, GrantPermissionsInput, UserAccessSummary};

use super::*;

impl PermissionAdminService {
    /// Returns a tenant user's memberships and effective permissions.
    pub async fn user_access_summary(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
    ) -> AppResult<UserAccessSummary> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::PermissionView)
            .await?;

        self.tenant_user(actor, user_id).await?;

        let mut memberships = self.repository.list_user_memberships(user_id).await?;
        memberships.sort_by(|left, right| left.group.code.cmp(&right.group.code));
        let permissions = self
            .authorization_service
            .describe_permissions(user_id)
            .await?;

        Ok(UserAccessSummary {
            user_id,
            memberships,
            permissions,
        })
    }

    /// Grants permissions directly to a tenant user in one transaction.
    ///
    /// Fails with `Conflict` when any pair already exists; nothing is applied.
    pub async fn grant_permissions_to_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
        input: GrantPermissionsInput,
    ) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::PermissionGrant)
            .await?;

        let permissions = normalized_batch(input.permissions)?;
        self.tenant_user(actor, user_id).await?;
        self.require_catalog_permissions(&permissions).await?;
        self.require_delegable(actor, &permissions).await?;

        let reason = input
            .reason
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        self.repository
            .grant_user_permissions(
                user_id,
                &permissions,
                DirectGrantAudit {
                    granted_by: actor.user_id(),
                    reason: reason.clone(),
                },
            )
            .await?;

        self.append_audit_event(
            actor,
            AuditAction::PermissionGranted,
            AuditResource::UserPermissionAssignment,
            user_id.to_string(),
            match reason {
                Some(reason) => format!(
                    "granted [{}] to user '{user_id}' (reason='{reason}')",
                    join_codes(&permissions)
                ),
                None => format!("granted [{}] to user '{user_id}'", join_codes(&permissions)),
            },
        )
        .await
    }

    /// Grants one permission directly to a tenant user.
    pub async fn grant_permission_to_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
        permission: PermissionCode,
        reason: Option<String>,
    ) -> AppResult<()> {
        self.grant_permissions_to_user(
            actor,
            user_id,
            GrantPermissionsInput {
                permissions: vec![permission],
                reason,
            },
        )
        .await
    }

    /// Revokes a direct grant; revoking an absent grant of a catalog
    /// permission is a no-op.
    pub async fn revoke_permission_from_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
        permission: &PermissionCode,
    ) -> AppResult<()> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::PermissionRevoke)
            .await?;

        self.tenant_user(actor, user_id).await?;
        self.require_catalog_permissions(std::slice::from_ref(permission))
            .await?;
        let removed = self
            .repository
            .revoke_user_permission(user_id, permission)
            .await?;

        if !removed {
            return Ok(());
        }

        self.append_audit_event(
            actor,
            AuditAction::PermissionRevoked,
            AuditResource::UserPermissionAssignment,
            format!("{user_id}:{permission}"),
            format!("revoked '{permission}' from user '{user_id}'"),
        )
        .await
    }
}

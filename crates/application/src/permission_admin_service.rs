use std::sync::Arc;

use salesdesk_core::{AppError, AppResult, AuthenticatedUser, GroupId, UserId};
use salesdesk_domain::{
    AdminPermission, AuditAction, AuditResource, PermissionCode, PermissionDefinition,
};
use tracing::warn;

use crate::permission_admin_ports::GroupDefinition;
use crate::{AuditEvent, AuditRepository, AuthorizationService, PermissionAdminRepository, UserDirectory};

mod grants;
mod groups;


/// Application service for group and grant administration.
///
/// Every operation is gated before it touches the store, and every mutation
/// that changes state appends an audit event. Actors can only hand out
/// permissions they hold themselves, whether through a grant, a group bundle
/// or a group membership.
///
/// The audit event is appended after the store commits the change. When the
/// append fails the caller sees the error although the change stays applied.
#[derive(Clone)]
pub struct PermissionAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn PermissionAdminRepository>,
    user_directory: Arc<dyn UserDirectory>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PermissionAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn PermissionAdminRepository>,
        user_directory: Arc<dyn UserDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            user_directory,
            audit_repository,
        }
    }

    /// Returns the permission catalog.
    pub async fn list_permissions(
        &self,
        actor: &AuthenticatedUser,
    ) -> AppResult<Vec<PermissionDefinition>> {
        self.authorization_service
            .require_admin_permission(actor, AdminPermission::PermissionView)
            .await?;

        self.repository.list_permissions().await
    }

    async fn visible_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
    ) -> AppResult<GroupDefinition> {
        self.repository
            .find_group(group_id)
            .await?
            .filter(|group| group.ownership.is_visible_to(actor.tenant_id()))
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' was not found")))
    }

    async fn editable_group(
        &self,
        actor: &AuthenticatedUser,
        group_id: GroupId,
    ) -> AppResult<GroupDefinition> {
        let group = self.visible_group(actor, group_id).await?;
        if group.ownership.is_system() {
            return Err(AppError::Forbidden(format!(
                "system group '{}' cannot be modified",
                group.code
            )));
        }

        Ok(group)
    }

    async fn tenant_user(
        &self,
        actor: &AuthenticatedUser,
        user_id: UserId,
    ) -> AppResult<AuthenticatedUser> {
        self.user_directory
            .find_user(user_id)
            .await?
            .filter(|user| user.tenant_id() == actor.tenant_id())
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    /// Fails with `NotFound` for codes missing from the catalog.
    async fn require_catalog_permissions(&self, permissions: &[PermissionCode]) -> AppResult<()> {
        for permission in permissions {
            if self.repository.find_permission(permission).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "permission '{permission}' was not found"
                )));
            }
        }

        Ok(())
    }

    /// Fails with `Forbidden` unless the actor holds every permission.
    async fn require_delegable(
        &self,
        actor: &AuthenticatedUser,
        permissions: &[PermissionCode],
    ) -> AppResult<()> {
        let held = self
            .authorization_service
            .resolve_permissions(actor.user_id())
            .await?;
        let missing: Vec<PermissionCode> = permissions
            .iter()
            .filter(|permission| !held.contains(permission))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        warn!(
            user_id = %actor.user_id(),
            missing = %join_codes(&missing),
            "rejected handing out permissions the actor does not hold"
        );
        Err(AppError::Forbidden(format!(
            "cannot hand out permissions you do not hold: [{}]",
            join_codes(&missing)
        )))
    }

    async fn append_audit_event(
        &self,
        actor: &AuthenticatedUser,
        action: AuditAction,
        resource_type: AuditResource,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                tenant_id: actor.tenant_id(),
                actor_user_id: actor.user_id(),
                action,
                resource_type,
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}

fn normalized_batch(permissions: Vec<PermissionCode>) -> AppResult<Vec<PermissionCode>> {
    let mut permissions = permissions;
    permissions.sort();
    permissions.dedup();

    if permissions.is_empty() {
        return Err(AppError::Validation(
            "at least one permission is required".to_owned(),
        ));
    }

    Ok(permissions)
}

fn join_codes(permissions: &[PermissionCode]) -> String {
    permissions
        .iter()
        .map(PermissionCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use salesdesk_application::{
    DirectGrantAudit, GroupDefinition, GroupMembership, NewGroup, PermissionAdminRepository,
};
use salesdesk_core::{AppError, AppResult, GroupId, PermissionId, TenantId, UserId};
use salesdesk_domain::{PermissionCode, PermissionDefinition};

use crate::postgres_rows::{
    GroupRow, PermissionRow, aggregate_groups, map_write_error, stored_group_id, stored_user_id,
};

mod grants;
mod groups;


/// PostgreSQL-backed repository for group and grant administration.
#[derive(Clone)]
pub struct PostgresPermissionAdminRepository {
    pool: PgPool,
}

impl PostgresPermissionAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

#[derive(Debug, FromRow)]
struct PermissionIdRow {
    id: i64,
    code: String,
}

#[async_trait]
impl PermissionAdminRepository for PostgresPermissionAdminRepository {
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT code, name, description, resource_type
            FROM permissions
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        rows.into_iter().map(PermissionRow::into_definition).collect()
    }

    async fn find_permission(
        &self,
        permission: &PermissionCode,
    ) -> AppResult<Option<PermissionDefinition>> {
        sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT code, name, description, resource_type
            FROM permissions
            WHERE code = $1
            "#,
        )
        .bind(permission.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find permission '{permission}': {error}"))
        })?
        .map(PermissionRow::into_definition)
        .transpose()
    }

    async fn list_groups(&self, tenant_id: TenantId) -> AppResult<Vec<GroupDefinition>> {
        self.list_groups_impl(tenant_id).await
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>> {
        self.find_group_impl(group_id).await
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<GroupDefinition> {
        self.create_group_impl(group).await
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        self.delete_group_impl(group_id).await
    }

    async fn attach_group_permissions(
        &self,
        group_id: GroupId,
        permissions: &[PermissionCode],
    ) -> AppResult<()> {
        self.attach_group_permissions_impl(group_id, permissions)
            .await
    }

    async fn detach_group_permission(
        &self,
        group_id: GroupId,
        permission: &PermissionCode,
    ) -> AppResult<bool> {
        self.detach_group_permission_impl(group_id, permission)
            .await
    }

    async fn add_group_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> AppResult<()> {
        self.add_group_member_impl(group_id, user_id, assigned_by)
            .await
    }

    async fn remove_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<bool> {
        self.remove_group_member_impl(group_id, user_id).await
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<GroupMembership>> {
        self.list_user_memberships_impl(user_id).await
    }

    async fn grant_user_permissions(
        &self,
        user_id: UserId,
        permissions: &[PermissionCode],
        audit: DirectGrantAudit,
    ) -> AppResult<()> {
        self.grant_user_permissions_impl(user_id, permissions, audit)
            .await
    }

    async fn revoke_user_permission(
        &self,
        user_id: UserId,
        permission: &PermissionCode,
    ) -> AppResult<bool> {
        self.revoke_user_permission_impl(user_id, permission).await
    }
}

/// Resolves catalog ids for the codes, in input order.
///
/// Any code missing from the catalog fails the whole batch with `NotFound`.
async fn resolve_permission_ids(
    transaction: &mut Transaction<'static, Postgres>,
    permissions: &[PermissionCode],
) -> AppResult<Vec<PermissionId>> {
    let codes: Vec<&str> = permissions.iter().map(PermissionCode::as_str).collect();
    let rows = sqlx::query_as::<_, PermissionIdRow>(
        r#"
        SELECT id, code
        FROM permissions
        WHERE code = ANY($1)
        "#,
    )
    .bind(codes)
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve permissions: {error}")))?;

    permissions
        .iter()
        .map(|permission| {
            rows.iter()
                .find(|row| row.code == permission.as_str())
                .ok_or_else(|| {
                    AppError::NotFound(format!("permission '{permission}' was not found"))
                })
                .and_then(|row| {
                    PermissionId::new(row.id).map_err(|error| {
                        AppError::Internal(format!("invalid stored permission id: {error}"))
                    })
                })
        })
        .collect()
}

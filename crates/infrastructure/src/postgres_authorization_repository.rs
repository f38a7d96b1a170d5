use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use salesdesk_application::{
    AuthorizationRepository, DirectPermissionGrant, GroupPermissionGrant, PermissionGrantDetails,
    PermissionSources,
};
use salesdesk_core::{AppError, AppResult, UserId};

use crate::postgres_rows::{
    PermissionRow, stored_group_code, stored_group_id, stored_permission_code, stored_user_id,
};


/// PostgreSQL-backed repository for permission lookups.
///
/// Both grant paths are read inside one `REPEATABLE READ` read-only
/// transaction, so a concurrent batch mutation is seen whole or not at all.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_snapshot(&self) -> AppResult<Transaction<'static, Postgres>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to open permission snapshot: {error}"))
            })?;

        Ok(transaction)
    }
}

#[derive(Debug, FromRow)]
struct DirectGrantRow {
    #[sqlx(flatten)]
    permission: PermissionRow,
    granted_by: Option<i64>,
    granted_at: DateTime<Utc>,
    reason: Option<String>,
}

#[derive(Debug, FromRow)]
struct GroupGrantRow {
    #[sqlx(flatten)]
    permission: PermissionRow,
    group_id: i64,
    group_code: String,
    group_name: String,
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn load_permission_sources(&self, user_id: UserId) -> AppResult<PermissionSources> {
        let mut transaction = self.begin_snapshot().await?;

        let direct = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permissions.code
            FROM user_permission_assignments AS grants
            INNER JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE grants.user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load direct permissions: {error}"))
        })?;

        let via_groups = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT permissions.code
            FROM user_group_assignments AS memberships
            INNER JOIN group_permissions
                ON group_permissions.group_id = memberships.group_id
            INNER JOIN permissions
                ON permissions.id = group_permissions.permission_id
            WHERE memberships.user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load group permissions: {error}"))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to close permission snapshot: {error}"))
        })?;

        Ok(PermissionSources {
            direct: direct
                .iter()
                .map(|code| stored_permission_code(code))
                .collect::<AppResult<_>>()?,
            via_groups: via_groups
                .iter()
                .map(|code| stored_permission_code(code))
                .collect::<AppResult<_>>()?,
        })
    }

    async fn load_grant_details(&self, user_id: UserId) -> AppResult<PermissionGrantDetails> {
        let mut transaction = self.begin_snapshot().await?;

        let direct_rows = sqlx::query_as::<_, DirectGrantRow>(
            r#"
            SELECT
                permissions.code,
                permissions.name,
                permissions.description,
                permissions.resource_type,
                grants.granted_by,
                grants.granted_at,
                grants.reason
            FROM user_permission_assignments AS grants
            INNER JOIN permissions
                ON permissions.id = grants.permission_id
            WHERE grants.user_id = $1
            ORDER BY permissions.code
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load direct grants: {error}")))?;

        let group_rows = sqlx::query_as::<_, GroupGrantRow>(
            r#"
            SELECT
                permissions.code,
                permissions.name,
                permissions.description,
                permissions.resource_type,
                groups.id AS group_id,
                groups.code AS group_code,
                groups.name AS group_name
            FROM user_group_assignments AS memberships
            INNER JOIN permission_groups AS groups
                ON groups.id = memberships.group_id
            INNER JOIN group_permissions
                ON group_permissions.group_id = groups.id
            INNER JOIN permissions
                ON permissions.id = group_permissions.permission_id
            WHERE memberships.user_id = $1
            ORDER BY permissions.code, groups.code
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load group grants: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to close permission snapshot: {error}"))
        })?;

        let direct = direct_rows
            .into_iter()
            .map(|row| {
                Ok(DirectPermissionGrant {
                    permission: row.permission.into_definition()?,
                    granted_by: row.granted_by.map(stored_user_id).transpose()?,
                    granted_at: row.granted_at,
                    reason: row.reason,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let via_groups = group_rows
            .into_iter()
            .map(|row| {
                Ok(GroupPermissionGrant {
                    permission: row.permission.into_definition()?,
                    group_id: stored_group_id(row.group_id)?,
                    group_code: stored_group_code(row.group_code.as_str())?,
                    group_name: row.group_name,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PermissionGrantDetails { direct, via_groups })
    }
}

use super::*;

const GROUP_COLUMNS: &str = r#"
    SELECT
        groups.id AS group_id,
        groups.code AS group_code,
        groups.name AS group_name,
        groups.description,
        groups.is_system,
        groups.company_id,
        permissions.code AS permission
    FROM permission_groups AS groups
    LEFT JOIN group_permissions
        ON group_permissions.group_id = groups.id
    LEFT JOIN permissions
        ON permissions.id = group_permissions.permission_id
"#;

#[derive(Debug, FromRow)]
struct MembershipRow {
    #[sqlx(flatten)]
    group: GroupRow,
    assigned_by: Option<i64>,
    assigned_at: DateTime<Utc>,
}

impl PostgresPermissionAdminRepository {
    pub(super) async fn list_groups_impl(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<GroupDefinition>> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            "{GROUP_COLUMNS} WHERE groups.is_system OR groups.company_id = $1 \
             ORDER BY groups.code, permissions.code"
        ))
        .bind(tenant_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list groups: {error}")))?;

        aggregate_groups(rows)
    }

    pub(super) async fn find_group_impl(
        &self,
        group_id: GroupId,
    ) -> AppResult<Option<GroupDefinition>> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            "{GROUP_COLUMNS} WHERE groups.id = $1 ORDER BY permissions.code"
        ))
        .bind(group_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find group: {error}")))?;

        Ok(aggregate_groups(rows)?.into_iter().next())
    }

    pub(super) async fn create_group_impl(&self, group: NewGroup) -> AppResult<GroupDefinition> {
        let mut transaction = self.begin().await?;
        let subject = format!("group '{}'", group.code);

        let group_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO permission_groups (code, name, description, is_system, company_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(group.code.as_str())
        .bind(group.name.as_str())
        .bind(group.description.as_deref())
        .bind(group.ownership.is_system())
        .bind(group.ownership.owning_tenant().map(|tenant_id| tenant_id.as_i64()))
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_write_error(error, subject.as_str(), "create group"))?;

        let permission_ids = resolve_permission_ids(&mut transaction, &group.permissions).await?;
        for permission_id in permission_ids {
            sqlx::query(
                r#"
                INSERT INTO group_permissions (group_id, permission_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(group_id)
            .bind(permission_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_write_error(error, "group permission", "attach permission"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        let mut permissions = group.permissions;
        permissions.sort();

        Ok(GroupDefinition {
            group_id: stored_group_id(group_id)?,
            code: group.code,
            name: group.name,
            description: group.description,
            ownership: group.ownership,
            permissions,
        })
    }

    pub(super) async fn delete_group_impl(&self, group_id: GroupId) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM permission_groups
            WHERE id = $1
            "#,
        )
        .bind(group_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete group: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "group '{group_id}' was not found"
            )));
        }

        Ok(())
    }

    pub(super) async fn attach_group_permissions_impl(
        &self,
        group_id: GroupId,
        permissions: &[PermissionCode],
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let permission_ids = resolve_permission_ids(&mut transaction, permissions).await?;

        for (permission, permission_id) in permissions.iter().zip(permission_ids) {
            let subject = format!("permission '{permission}' on group '{group_id}'");
            sqlx::query(
                r#"
                INSERT INTO group_permissions (group_id, permission_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(group_id.as_i64())
            .bind(permission_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_write_error(error, subject.as_str(), "attach permission"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn detach_group_permission_impl(
        &self,
        group_id: GroupId,
        permission: &PermissionCode,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM group_permissions
            USING permissions
            WHERE group_permissions.permission_id = permissions.id
                AND group_permissions.group_id = $1
                AND permissions.code = $2
            "#,
        )
        .bind(group_id.as_i64())
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach permission: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(super) async fn add_group_member_impl(
        &self,
        group_id: GroupId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> AppResult<()> {
        let subject = format!("membership of user '{user_id}' in group '{group_id}'");
        sqlx::query(
            r#"
            INSERT INTO user_group_assignments (user_id, group_id, assigned_by)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id.as_i64())
        .bind(group_id.as_i64())
        .bind(assigned_by.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| map_write_error(error, subject.as_str(), "add group member"))?;

        Ok(())
    }

    pub(super) async fn remove_group_member_impl(
        &self,
        group_id: GroupId,
        user_id: UserId,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_group_assignments
            WHERE user_id = $1 AND group_id = $2
            "#,
        )
        .bind(user_id.as_i64())
        .bind(group_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove group member: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(super) async fn list_user_memberships_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<GroupMembership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                groups.id AS group_id,
                groups.code AS group_code,
                groups.name AS group_name,
                groups.description,
                groups.is_system,
                groups.company_id,
                permissions.code AS permission,
                memberships.assigned_by,
                memberships.assigned_at
            FROM user_group_assignments AS memberships
            INNER JOIN permission_groups AS groups
                ON groups.id = memberships.group_id
            LEFT JOIN group_permissions
                ON group_permissions.group_id = groups.id
            LEFT JOIN permissions
                ON permissions.id = group_permissions.permission_id
            WHERE memberships.user_id = $1
            ORDER BY groups.code, permissions.code
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list memberships: {error}")))?;

        let mut assignments: Vec<(i64, Option<i64>, DateTime<Utc>)> = Vec::new();
        let mut group_rows = Vec::with_capacity(rows.len());
        for row in rows {
            if assignments
                .last()
                .is_none_or(|(group_id, _, _)| *group_id != row.group.group_id)
            {
                assignments.push((row.group.group_id, row.assigned_by, row.assigned_at));
            }
            group_rows.push(row.group);
        }

        aggregate_groups(group_rows)?
            .into_iter()
            .zip(assignments)
            .map(|(group, (_, assigned_by, assigned_at))| {
                Ok(GroupMembership {
                    group,
                    assigned_by: assigned_by.map(stored_user_id).transpose()?,
                    assigned_at,
                })
            })
            .collect()
    }
}

use super::*;

impl PostgresPermissionAdminRepository {
    pub(super) async fn grant_user_permissions_impl(
        &self,
        user_id: UserId,
        permissions: &[PermissionCode],
        audit: DirectGrantAudit,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        let permission_ids = resolve_permission_ids(&mut transaction, permissions).await?;

        for (permission, permission_id) in permissions.iter().zip(permission_ids) {
            let subject = format!("grant of '{permission}' to user '{user_id}'");
            sqlx::query(
                r#"
                INSERT INTO user_permission_assignments (user_id, permission_id, granted_by, reason)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(user_id.as_i64())
            .bind(permission_id.as_i64())
            .bind(audit.granted_by.as_i64())
            .bind(audit.reason.as_deref())
            .execute(&mut *transaction)
            .await
            .map_err(|error| map_write_error(error, subject.as_str(), "grant permission"))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn revoke_user_permission_impl(
        &self,
        user_id: UserId,
        permission: &PermissionCode,
    ) -> AppResult<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM user_permission_assignments AS grants
            USING permissions
            WHERE grants.permission_id = permissions.id
                AND grants.user_id = $1
                AND permissions.code = $2
            "#,
        )
        .bind(user_id.as_i64())
        .bind(permission.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permission: {error}")))?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}

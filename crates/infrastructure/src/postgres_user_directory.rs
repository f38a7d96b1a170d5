use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use salesdesk_application::UserDirectory;
use salesdesk_core::{AppError, AppResult, AuthenticatedUser, UserId};

use crate::postgres_rows::{stored_tenant_id, stored_user_id};

/// PostgreSQL-backed lookup over the externally owned `users` table.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    company_id: i64,
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<AuthenticatedUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, company_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        row.map(|row| {
            Ok(AuthenticatedUser::new(
                stored_user_id(row.id)?,
                row.name,
                stored_tenant_id(row.company_id)?,
            ))
        })
        .transpose()
    }
}

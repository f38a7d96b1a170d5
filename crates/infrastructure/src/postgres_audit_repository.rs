use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use salesdesk_application::{AuditEvent, AuditRepository};
use salesdesk_core::{AppError, AppResult};

/// Appends permission administration events to `audit_log_entries`.
///
/// Rows keep the company and actor as foreign keys; deleting the actor later
/// clears `actor_user_id` but keeps the entry.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        let AuditEvent {
            tenant_id,
            actor_user_id,
            action,
            resource_type,
            resource_id,
            detail,
        } = event;

        let entry_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO audit_log_entries (
                company_id,
                actor_user_id,
                action,
                resource_type,
                resource_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(tenant_id.as_i64())
        .bind(actor_user_id.as_i64())
        .bind(action.as_str())
        .bind(resource_type.as_str())
        .bind(resource_id.as_str())
        .bind(detail)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to record audit event '{}' for {} '{resource_id}': {error}",
                action.as_str(),
                resource_type.as_str()
            ))
        })?;

        debug!(
            entry_id,
            company_id = %tenant_id,
            action = action.as_str(),
            resource_type = resource_type.as_str(),
            "audit entry recorded"
        );

        Ok(())
    }
}

use sqlx::PgPool;
use tracing::info;

use salesdesk_core::{AppError, AppResult};
use salesdesk_domain::{AuditAction, permission_catalog, system_group_seeds};

/// Outcome of one catalog synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSyncSummary {
    /// Catalog entries inserted or refreshed.
    pub permissions: usize,
    /// Stored codes removed because they left the catalog.
    pub retired_permissions: u64,
    /// System groups inserted or refreshed.
    pub system_groups: usize,
}

/// Seeds the static catalog and system groups in one transaction.
///
/// Idempotent. Codes no longer in the catalog are deleted together with their
/// grants, and system group bundles are reset to their seeded contents.
pub async fn sync_permission_catalog(pool: &PgPool) -> AppResult<CatalogSyncSummary> {
    let catalog = permission_catalog()?;
    let seeds = system_group_seeds()?;

    let mut transaction = pool
        .begin()
        .await
        .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))?;

    for definition in &catalog {
        sqlx::query(
            r#"
            INSERT INTO permissions (code, name, description, resource_type)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (code) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                resource_type = EXCLUDED.resource_type,
                updated_at = now()
            "#,
        )
        .bind(definition.code.as_str())
        .bind(definition.name.as_str())
        .bind(definition.description.as_deref())
        .bind(definition.resource_type.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to seed permission '{}': {error}",
                definition.code
            ))
        })?;
    }

    let catalog_codes: Vec<&str> = catalog
        .iter()
        .map(|definition| definition.code.as_str())
        .collect();
    let retired_permissions = sqlx::query(
        r#"
        DELETE FROM permissions
        WHERE NOT (code = ANY($1))
        "#,
    )
    .bind(catalog_codes)
    .execute(&mut *transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to retire permissions: {error}")))?
    .rows_affected();

    for seed in &seeds {
        let group_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO permission_groups (code, name, description, is_system, company_id)
            VALUES ($1, $2, $3, true, NULL)
            ON CONFLICT (code) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                updated_at = now()
            WHERE permission_groups.is_system
            RETURNING id
            "#,
        )
        .bind(seed.code)
        .bind(seed.name)
        .bind(seed.description)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to seed group '{}': {error}", seed.code))
        })?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "group code '{}' is taken by a company group",
                seed.code
            ))
        })?;

        sqlx::query("DELETE FROM group_permissions WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to reset group '{}': {error}", seed.code))
            })?;

        let bundle: Vec<String> = seed
            .permission_codes(&catalog)
            .iter()
            .map(|code| code.as_str().to_owned())
            .collect();
        sqlx::query(
            r#"
            INSERT INTO group_permissions (group_id, permission_id)
            SELECT $1, id
            FROM permissions
            WHERE code = ANY($2)
            "#,
        )
        .bind(group_id)
        .bind(bundle)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to seed permissions of group '{}': {error}",
                seed.code
            ))
        })?;
    }

    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))?;

    let summary = CatalogSyncSummary {
        permissions: catalog.len(),
        retired_permissions,
        system_groups: seeds.len(),
    };
    info!(
        action = AuditAction::PermissionCatalogSynchronized.as_str(),
        permissions = summary.permissions,
        retired_permissions = summary.retired_permissions,
        system_groups = summary.system_groups,
        "permission catalog synchronized"
    );

    Ok(summary)
}

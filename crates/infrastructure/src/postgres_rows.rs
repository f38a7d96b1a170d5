use salesdesk_core::{AppError, AppResult, GroupId, TenantId, UserId};
use salesdesk_domain::{GroupCode, GroupOwnership, PermissionCode, PermissionDefinition};
use sqlx::FromRow;

use salesdesk_application::GroupDefinition;

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    pub(crate) code: String,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) resource_type: String,
}

impl PermissionRow {
    pub(crate) fn into_definition(self) -> AppResult<PermissionDefinition> {
        Ok(PermissionDefinition {
            code: stored_permission_code(self.code.as_str())?,
            name: self.name,
            description: self.description,
            resource_type: self.resource_type,
        })
    }
}

/// One `(group, permission)` row of a `LEFT JOIN` over group grants.
#[derive(Debug, FromRow)]
pub(crate) struct GroupRow {
    pub(crate) group_id: i64,
    pub(crate) group_code: String,
    pub(crate) group_name: String,
    pub(crate) description: Option<String>,
    pub(crate) is_system: bool,
    pub(crate) company_id: Option<i64>,
    pub(crate) permission: Option<String>,
}

pub(crate) fn stored_permission_code(value: &str) -> AppResult<PermissionCode> {
    PermissionCode::new(value).map_err(|error| {
        AppError::Internal(format!("invalid stored permission code '{value}': {error}"))
    })
}

pub(crate) fn stored_group_id(value: i64) -> AppResult<GroupId> {
    GroupId::new(value)
        .map_err(|error| AppError::Internal(format!("invalid stored group id '{value}': {error}")))
}

pub(crate) fn stored_user_id(value: i64) -> AppResult<UserId> {
    UserId::new(value)
        .map_err(|error| AppError::Internal(format!("invalid stored user id '{value}': {error}")))
}

pub(crate) fn stored_tenant_id(value: i64) -> AppResult<TenantId> {
    TenantId::new(value)
        .map_err(|error| AppError::Internal(format!("invalid stored tenant id '{value}': {error}")))
}

pub(crate) fn stored_group_code(value: &str) -> AppResult<GroupCode> {
    GroupCode::new(value)
        .map_err(|error| AppError::Internal(format!("invalid stored group code '{value}': {error}")))
}

/// Folds rows ordered by group code then permission code into definitions.
pub(crate) fn aggregate_groups(rows: Vec<GroupRow>) -> AppResult<Vec<GroupDefinition>> {
    let mut groups: Vec<GroupDefinition> = Vec::new();

    for row in rows {
        let group_id = stored_group_id(row.group_id)?;
        let is_new_group = groups
            .last()
            .is_none_or(|group| group.group_id != group_id);

        if is_new_group {
            let owning_tenant = row.company_id.map(stored_tenant_id).transpose()?;
            let ownership = GroupOwnership::from_storage(row.is_system, owning_tenant)
                .map_err(|error| {
                    AppError::Internal(format!(
                        "invalid stored ownership for group '{}': {error}",
                        row.group_code
                    ))
                })?;

            groups.push(GroupDefinition {
                group_id,
                code: stored_group_code(row.group_code.as_str())?,
                name: row.group_name,
                description: row.description,
                ownership,
                permissions: Vec::new(),
            });
        }

        if let (Some(group), Some(permission)) = (groups.last_mut(), row.permission) {
            group
                .permissions
                .push(stored_permission_code(permission.as_str())?);
        }
    }

    Ok(groups)
}

/// Maps write failures: unique violations to `Conflict`, foreign key
/// violations to `NotFound`, everything else to `Internal`.
pub(crate) fn map_write_error(error: sqlx::Error, subject: &str, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => return AppError::Conflict(format!("{subject} already exists")),
            Some("23503") => {
                return AppError::NotFound(format!("{subject} references a missing record"));
            }
            _ => {}
        }
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

use axum::Json;
use axum::extract::{Extension, State};
use salesdesk_application::{AccessDecision, Denial};
use salesdesk_core::{AppError, AuthenticatedUser};
use salesdesk_domain::{PermissionRequirement, RequirementMode};

use crate::dto::{
    CheckPermissionsRequest, CheckPermissionsResponse, MyPermissionsResponse, PermissionResponse,
    ResolvedPermissionResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::permission_codes;

pub async fn my_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<MyPermissionsResponse>> {
    let permissions = state
        .authorization_service
        .describe_permissions(user.user_id())
        .await?
        .into_iter()
        .map(ResolvedPermissionResponse::from)
        .collect();

    Ok(Json(MyPermissionsResponse {
        user_id: user.user_id().as_i64(),
        display_name: user.display_name().to_owned(),
        company_id: user.tenant_id().as_i64(),
        permissions,
    }))
}

pub async fn check_my_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CheckPermissionsRequest>,
) -> ApiResult<Json<CheckPermissionsResponse>> {
    let mode = match payload.mode.as_deref().map(str::trim) {
        None | Some("all") => RequirementMode::All,
        Some("any") => RequirementMode::Any,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "mode must be either 'all' or 'any', got '{other}'"
            ))
            .into());
        }
    };
    let requirement = PermissionRequirement::new(permission_codes(&payload.permissions)?, mode);

    let message = match state
        .authorization_service
        .check(user.user_id(), &requirement)
        .await
    {
        AccessDecision::Allow => None,
        AccessDecision::Deny(denial @ Denial::MissingPermissions(_)) => Some(denial.message()),
        AccessDecision::Deny(denial @ Denial::ResolutionUnavailable) => {
            return Err(denial.into_error().into());
        }
    };

    Ok(Json(CheckPermissionsResponse {
        allowed: message.is_none(),
        mode: requirement.mode().as_str().to_owned(),
        permissions: requirement
            .codes()
            .iter()
            .map(|code| code.as_str().to_owned())
            .collect(),
        message,
    }))
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .permission_admin_service
        .list_permissions(&user)
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

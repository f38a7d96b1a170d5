use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use salesdesk_application::GrantPermissionsInput;
use salesdesk_core::AuthenticatedUser;
use salesdesk_domain::PermissionCode;

use crate::dto::{GrantPermissionsRequest, GrantReasonQuery, UserAccessResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{permission_codes, user_id};

pub async fn user_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_user_id): Path<i64>,
) -> ApiResult<Json<UserAccessResponse>> {
    let summary = state
        .permission_admin_service
        .user_access_summary(&user, user_id(raw_user_id)?)
        .await?;

    Ok(Json(UserAccessResponse::from(summary)))
}

pub async fn grant_user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_user_id): Path<i64>,
    Json(payload): Json<GrantPermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .grant_permissions_to_user(
            &user,
            user_id(raw_user_id)?,
            GrantPermissionsInput {
                permissions: permission_codes(&payload.permissions)?,
                reason: payload.reason,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn grant_user_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((raw_user_id, code)): Path<(i64, String)>,
    Query(query): Query<GrantReasonQuery>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .grant_permission_to_user(
            &user,
            user_id(raw_user_id)?,
            PermissionCode::from_transport(code.as_str())?,
            query.reason,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn revoke_user_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((raw_user_id, code)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .revoke_permission_from_user(
            &user,
            user_id(raw_user_id)?,
            &PermissionCode::from_transport(code.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

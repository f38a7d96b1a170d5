use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use salesdesk_application::CreateGroupInput;
use salesdesk_core::AuthenticatedUser;
use salesdesk_domain::{GroupCode, PermissionCode};

use crate::dto::{AttachGroupPermissionsRequest, CreateGroupRequest, GroupResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{group_id, permission_codes, user_id};

pub async fn list_groups_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Json<Vec<GroupResponse>>> {
    let groups = state
        .permission_admin_service
        .list_groups(&user)
        .await?
        .into_iter()
        .map(GroupResponse::from)
        .collect();

    Ok(Json(groups))
}

pub async fn get_group_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_group_id): Path<i64>,
) -> ApiResult<Json<GroupResponse>> {
    let group = state
        .permission_admin_service
        .get_group(&user, group_id(raw_group_id)?)
        .await?;

    Ok(Json(GroupResponse::from(group)))
}

pub async fn create_group_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<GroupResponse>)> {
    let group = state
        .permission_admin_service
        .create_group(
            &user,
            CreateGroupInput {
                code: GroupCode::new(payload.code)?,
                name: payload.name,
                description: payload.description,
                permissions: permission_codes(&payload.permissions)?,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

pub async fn delete_group_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_group_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .delete_group(&user, group_id(raw_group_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn attach_group_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(raw_group_id): Path<i64>,
    Json(payload): Json<AttachGroupPermissionsRequest>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .attach_permissions_to_group(
            &user,
            group_id(raw_group_id)?,
            permission_codes(&payload.permissions)?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn attach_group_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((raw_group_id, code)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .attach_permission_to_group(
            &user,
            group_id(raw_group_id)?,
            PermissionCode::from_transport(code.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn detach_group_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((raw_group_id, code)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .detach_permission_from_group(
            &user,
            group_id(raw_group_id)?,
            &PermissionCode::from_transport(code.as_str())?,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_group_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((raw_group_id, raw_user_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .add_user_to_group(&user, group_id(raw_group_id)?, user_id(raw_user_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_group_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((raw_group_id, raw_user_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state
        .permission_admin_service
        .remove_user_from_group(&user, group_id(raw_group_id)?, user_id(raw_user_id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

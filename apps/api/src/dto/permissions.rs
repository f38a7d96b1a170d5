use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// API representation of a catalog permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub resource_type: String,
}

/// API representation of a permission group.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/group-response.ts"
)]
pub struct GroupResponse {
    pub group_id: i64,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub company_id: Option<i64>,
    pub permissions: Vec<String>,
}

/// Incoming payload for group creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-group-request.ts"
)]
pub struct CreateGroupRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Incoming payload for attaching several permissions to a group.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/attach-group-permissions-request.ts"
)]
pub struct AttachGroupPermissionsRequest {
    pub permissions: Vec<String>,
}

/// Incoming payload for granting several permissions to a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grant-permissions-request.ts"
)]
pub struct GrantPermissionsRequest {
    pub permissions: Vec<String>,
    pub reason: Option<String>,
}

/// Optional reason attached to a single direct grant.
#[derive(Debug, Deserialize)]
pub struct GrantReasonQuery {
    pub reason: Option<String>,
}

/// Incoming payload for evaluating a requirement against the caller.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-permissions-request.ts"
)]
pub struct CheckPermissionsRequest {
    pub permissions: Vec<String>,
    /// `all` (default) or `any`.
    pub mode: Option<String>,
}

/// Outcome of a permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/check-permissions-response.ts"
)]
pub struct CheckPermissionsResponse {
    pub allowed: bool,
    pub mode: String,
    pub permissions: Vec<String>,
    pub message: Option<String>,
}

/// Direct grant details of a resolved permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/direct-grant-response.ts"
)]
pub struct DirectGrantResponse {
    pub granted_by: Option<i64>,
    pub granted_at: String,
    pub reason: Option<String>,
}

/// Group granting a resolved permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/group-source-response.ts"
)]
pub struct GroupSourceResponse {
    pub group_id: i64,
    pub code: String,
    pub name: String,
}

/// One effective permission with every path that grants it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resolved-permission-response.ts"
)]
pub struct ResolvedPermissionResponse {
    pub code: String,
    pub name: String,
    pub resource_type: String,
    pub direct: Option<DirectGrantResponse>,
    pub groups: Vec<GroupSourceResponse>,
}

/// The caller's identity and effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/my-permissions-response.ts"
)]
pub struct MyPermissionsResponse {
    pub user_id: i64,
    pub display_name: String,
    pub company_id: i64,
    pub permissions: Vec<ResolvedPermissionResponse>,
}

/// One group membership of a user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/group-membership-response.ts"
)]
pub struct GroupMembershipResponse {
    pub group: GroupResponse,
    pub assigned_by: Option<i64>,
    pub assigned_at: String,
}

/// Administrative view of a user's assignments.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-access-response.ts"
)]
pub struct UserAccessResponse {
    pub user_id: i64,
    pub memberships: Vec<GroupMembershipResponse>,
    pub permissions: Vec<ResolvedPermissionResponse>,
}

mod common;
mod permissions;

pub use common::HealthResponse;
pub use permissions::{
    AttachGroupPermissionsRequest, CheckPermissionsRequest, CheckPermissionsResponse,
    CreateGroupRequest, GrantPermissionsRequest, GrantReasonQuery, GroupResponse,
    MyPermissionsResponse, PermissionResponse, ResolvedPermissionResponse, UserAccessResponse,
};

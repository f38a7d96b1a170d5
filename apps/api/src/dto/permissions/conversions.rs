use salesdesk_application::{
    GroupDefinition, GroupMembership, PermissionProvenance, UserAccessSummary,
};
use salesdesk_domain::PermissionDefinition;

use super::{
    DirectGrantResponse, GroupMembershipResponse, GroupResponse, GroupSourceResponse,
    PermissionResponse, ResolvedPermissionResponse, UserAccessResponse,
};

impl From<PermissionDefinition> for PermissionResponse {
    fn from(value: PermissionDefinition) -> Self {
        Self {
            code: value.code.into(),
            name: value.name,
            description: value.description,
            resource_type: value.resource_type,
        }
    }
}

impl From<GroupDefinition> for GroupResponse {
    fn from(value: GroupDefinition) -> Self {
        Self {
            group_id: value.group_id.as_i64(),
            code: value.code.into(),
            name: value.name,
            description: value.description,
            is_system: value.ownership.is_system(),
            company_id: value.ownership.owning_tenant().map(i64::from),
            permissions: value.permissions.into_iter().map(String::from).collect(),
        }
    }
}

impl From<PermissionProvenance> for ResolvedPermissionResponse {
    fn from(value: PermissionProvenance) -> Self {
        Self {
            code: value.permission.code.into(),
            name: value.permission.name,
            resource_type: value.permission.resource_type,
            direct: value.direct.map(|grant| DirectGrantResponse {
                granted_by: grant.granted_by.map(i64::from),
                granted_at: grant.granted_at.to_rfc3339(),
                reason: grant.reason,
            }),
            groups: value
                .groups
                .into_iter()
                .map(|group| GroupSourceResponse {
                    group_id: group.group_id.as_i64(),
                    code: group.code.into(),
                    name: group.name,
                })
                .collect(),
        }
    }
}

impl From<GroupMembership> for GroupMembershipResponse {
    fn from(value: GroupMembership) -> Self {
        Self {
            group: GroupResponse::from(value.group),
            assigned_by: value.assigned_by.map(i64::from),
            assigned_at: value.assigned_at.to_rfc3339(),
        }
    }
}

impl From<UserAccessSummary> for UserAccessResponse {
    fn from(value: UserAccessSummary) -> Self {
        Self {
            user_id: value.user_id.as_i64(),
            memberships: value
                .memberships
                .into_iter()
                .map(GroupMembershipResponse::from)
                .collect(),
            permissions: value
                .permissions
                .into_iter()
                .map(ResolvedPermissionResponse::from)
                .collect(),
        }
    }
}

use super::*;

impl InMemoryPermissionStore {
    pub(super) async fn load_permission_sources_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<PermissionSources> {
        let state = self.state.read().await;

        Ok(PermissionSources {
            direct: state
                .direct_grants
                .keys()
                .filter(|(grantee, _)| *grantee == user_id)
                .map(|(_, permission)| permission.clone())
                .collect(),
            via_groups: state
                .member_groups(user_id)
                .flat_map(|(_, group)| group.permissions.iter().cloned())
                .collect(),
        })
    }

    pub(super) async fn load_grant_details_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<PermissionGrantDetails> {
        let state = self.state.read().await;

        let direct = state
            .direct_grants
            .iter()
            .filter(|((grantee, _), _)| *grantee == user_id)
            .map(|((_, permission), grant)| {
                Ok(DirectPermissionGrant {
                    permission: state.definition(permission)?,
                    granted_by: grant.granted_by,
                    granted_at: grant.granted_at,
                    reason: grant.reason.clone(),
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let mut via_groups = Vec::new();
        for (group_id, group) in state.member_groups(user_id) {
            for permission in &group.permissions {
                via_groups.push(GroupPermissionGrant {
                    permission: state.definition(permission)?,
                    group_id,
                    group_code: group.code.clone(),
                    group_name: group.name.clone(),
                });
            }
        }

        Ok(PermissionGrantDetails { direct, via_groups })
    }
}

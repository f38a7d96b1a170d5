use super::*;

impl InMemoryPermissionStore {
    pub(super) async fn list_groups_impl(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Vec<GroupDefinition>> {
        let state = self.state.read().await;

        let mut groups: Vec<GroupDefinition> = state
            .groups
            .iter()
            .filter(|(_, group)| group.ownership.is_visible_to(tenant_id))
            .map(|(group_id, group)| state.group_definition(*group_id, group))
            .collect();
        groups.sort_by(|left, right| left.code.cmp(&right.code));

        Ok(groups)
    }

    pub(super) async fn create_group_impl(&self, group: NewGroup) -> AppResult<GroupDefinition> {
        let mut state = self.state.write().await;

        if state.group_id_by_code(&group.code).is_some() {
            return Err(AppError::Conflict(format!(
                "group '{}' already exists",
                group.code
            )));
        }
        if let Some(owner) = group.ownership.owning_tenant()
            && !state.tenants.contains(&owner)
        {
            return Err(AppError::NotFound(format!("company '{owner}' was not found")));
        }
        state.require_known_permissions(&group.permissions)?;
        StoreState::reject_repeated_codes(&group.permissions, "the new group")?;

        let group_id = state.next_group_id()?;
        let stored = StoredGroup {
            code: group.code,
            name: group.name,
            description: group.description,
            ownership: group.ownership,
            permissions: group.permissions.into_iter().collect(),
        };
        let definition = state.group_definition(group_id, &stored);
        state.groups.insert(group_id, stored);

        Ok(definition)
    }

    pub(super) async fn delete_group_impl(&self, group_id: GroupId) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.groups.remove(&group_id).is_none() {
            return Err(AppError::NotFound(format!(
                "group '{group_id}' was not found"
            )));
        }
        state
            .memberships
            .retain(|(_, member_group), _| *member_group != group_id);

        Ok(())
    }

    pub(super) async fn attach_group_permissions_impl(
        &self,
        group_id: GroupId,
        permissions: &[PermissionCode],
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_known_permissions(permissions)?;
        StoreState::reject_repeated_codes(permissions, "the batch")?;

        let Some(group) = state.groups.get_mut(&group_id) else {
            return Err(AppError::NotFound(format!(
                "group '{group_id}' was not found"
            )));
        };
        if let Some(existing) = permissions
            .iter()
            .find(|permission| group.permissions.contains(*permission))
        {
            return Err(AppError::Conflict(format!(
                "permission '{existing}' on group '{group_id}' already exists"
            )));
        }

        group.permissions.extend(permissions.iter().cloned());
        Ok(())
    }

    pub(super) async fn add_group_member_impl(
        &self,
        group_id: GroupId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_known_user(user_id)?;
        if !state.groups.contains_key(&group_id) {
            return Err(AppError::NotFound(format!(
                "group '{group_id}' was not found"
            )));
        }
        if state.memberships.contains_key(&(user_id, group_id)) {
            return Err(AppError::Conflict(format!(
                "membership of user '{user_id}' in group '{group_id}' already exists"
            )));
        }

        let assigned_by = state.users.contains_key(&assigned_by).then_some(assigned_by);
        state.memberships.insert(
            (user_id, group_id),
            StoredMembership {
                assigned_by,
                assigned_at: Utc::now(),
            },
        );

        Ok(())
    }

    pub(super) async fn list_user_memberships_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<GroupMembership>> {
        let state = self.state.read().await;

        let mut memberships: Vec<GroupMembership> = state
            .memberships
            .iter()
            .filter(|((member, _), _)| *member == user_id)
            .filter_map(|((_, group_id), membership)| {
                state.groups.get(group_id).map(|group| GroupMembership {
                    group: state.group_definition(*group_id, group),
                    assigned_by: membership.assigned_by,
                    assigned_at: membership.assigned_at,
                })
            })
            .collect();
        memberships.sort_by(|left, right| left.group.code.cmp(&right.group.code));

        Ok(memberships)
    }

    pub(super) async fn grant_user_permissions_impl(
        &self,
        user_id: UserId,
        permissions: &[PermissionCode],
        audit: DirectGrantAudit,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_known_user(user_id)?;
        state.require_known_permissions(permissions)?;
        StoreState::reject_repeated_codes(permissions, "the batch")?;

        if let Some(existing) = permissions
            .iter()
            .find(|permission| state.direct_grants.contains_key(&(user_id, (*permission).clone())))
        {
            return Err(AppError::Conflict(format!(
                "grant of '{existing}' to user '{user_id}' already exists"
            )));
        }

        let granted_by = state
            .users
            .contains_key(&audit.granted_by)
            .then_some(audit.granted_by);
        let granted_at = Utc::now();
        for permission in permissions {
            state.direct_grants.insert(
                (user_id, permission.clone()),
                StoredDirectGrant {
                    granted_by,
                    granted_at,
                    reason: audit.reason.clone(),
                },
            );
        }

        Ok(())
    }
}

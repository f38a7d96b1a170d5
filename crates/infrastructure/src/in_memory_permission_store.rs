use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::info;

use salesdesk_application::{
    AuditEvent, AuditRepository, AuthorizationRepository, DirectGrantAudit,
    DirectPermissionGrant, GroupDefinition, GroupMembership, GroupPermissionGrant, NewGroup,
    PermissionAdminRepository, PermissionGrantDetails, PermissionSources, UserDirectory,
};
use salesdesk_core::{AppError, AppResult, AuthenticatedUser, GroupId, TenantId, UserId};
use salesdesk_domain::{
    AuditAction, GroupCode, GroupOwnership, PermissionCode, PermissionDefinition,
    permission_catalog, system_group_seeds,
};

mod admin;
mod authorization;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct StoredGroup {
    code: GroupCode,
    name: String,
    description: Option<String>,
    ownership: GroupOwnership,
    permissions: BTreeSet<PermissionCode>,
}

#[derive(Debug, Clone)]
struct StoredMembership {
    assigned_by: Option<UserId>,
    assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredDirectGrant {
    granted_by: Option<UserId>,
    granted_at: DateTime<Utc>,
    reason: Option<String>,
}

#[derive(Debug, Default)]
struct StoreState {
    permissions: BTreeMap<PermissionCode, PermissionDefinition>,
    groups: BTreeMap<GroupId, StoredGroup>,
    last_group_id: i64,
    memberships: BTreeMap<(UserId, GroupId), StoredMembership>,
    direct_grants: BTreeMap<(UserId, PermissionCode), StoredDirectGrant>,
    users: HashMap<UserId, AuthenticatedUser>,
    tenants: BTreeSet<TenantId>,
    audit_events: Vec<AuditEvent>,
}

/// In-memory store implementing every permission port.
///
/// One lock guards the whole state, so reads see a consistent snapshot and
/// batch writes apply all-or-nothing, mirroring the PostgreSQL adapters.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    state: RwLock<StoreState>,
}

impl InMemoryPermissionStore {
    /// Creates an empty store without catalog entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the static catalog and system groups.
    ///
    /// Same contract as `sync_permission_catalog`: retired codes are removed
    /// with their grants and system group bundles are reset.
    pub async fn sync_catalog(&self) -> AppResult<()> {
        let catalog = permission_catalog()?;
        let seeds = system_group_seeds()?;
        let mut state = self.state.write().await;

        let retired: Vec<PermissionCode> = state
            .permissions
            .keys()
            .filter(|code| catalog.iter().all(|definition| &definition.code != *code))
            .cloned()
            .collect();
        for code in &retired {
            state.remove_permission(code);
        }
        for definition in &catalog {
            state
                .permissions
                .insert(definition.code.clone(), definition.clone());
        }

        for seed in &seeds {
            let code = GroupCode::new(seed.code)?;
            let permissions: BTreeSet<PermissionCode> =
                seed.permission_codes(&catalog).into_iter().collect();

            match state.group_id_by_code(&code) {
                Some(group_id) => {
                    let Some(group) = state.groups.get_mut(&group_id) else {
                        continue;
                    };
                    if !group.ownership.is_system() {
                        return Err(AppError::Conflict(format!(
                            "group code '{code}' is taken by a company group"
                        )));
                    }
                    group.name = seed.name.to_owned();
                    group.description = Some(seed.description.to_owned());
                    group.permissions = permissions;
                }
                None => {
                    let group_id = state.next_group_id()?;
                    state.groups.insert(
                        group_id,
                        StoredGroup {
                            code,
                            name: seed.name.to_owned(),
                            description: Some(seed.description.to_owned()),
                            ownership: GroupOwnership::System,
                            permissions,
                        },
                    );
                }
            }
        }

        info!(
            action = AuditAction::PermissionCatalogSynchronized.as_str(),
            permissions = catalog.len(),
            retired_permissions = retired.len(),
            system_groups = seeds.len(),
            "permission catalog synchronized"
        );

        Ok(())
    }

    /// Registers a company owned by the surrounding CRUD system.
    pub async fn insert_tenant(&self, tenant_id: TenantId) {
        self.state.write().await.tenants.insert(tenant_id);
    }

    /// Registers a user owned by the surrounding CRUD system, together with
    /// their company.
    pub async fn insert_user(&self, user: AuthenticatedUser) {
        let mut state = self.state.write().await;
        state.tenants.insert(user.tenant_id());
        state.users.insert(user.user_id(), user);
    }

    /// Deletes a user; memberships and direct grants go with it and the
    /// user's name is cleared from grants they made.
    pub async fn remove_user(&self, user_id: UserId) {
        let mut state = self.state.write().await;
        state.users.remove(&user_id);
        state.memberships.retain(|(member, _), _| *member != user_id);
        state.direct_grants.retain(|(grantee, _), _| *grantee != user_id);

        for membership in state.memberships.values_mut() {
            if membership.assigned_by == Some(user_id) {
                membership.assigned_by = None;
            }
        }
        for grant in state.direct_grants.values_mut() {
            if grant.granted_by == Some(user_id) {
                grant.granted_by = None;
            }
        }
    }

    /// Finds a group identifier by code.
    pub async fn find_group_id(&self, code: &GroupCode) -> Option<GroupId> {
        self.state.read().await.group_id_by_code(code)
    }

    /// Returns every audit event appended so far, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

impl StoreState {
    fn next_group_id(&mut self) -> AppResult<GroupId> {
        self.last_group_id += 1;
        GroupId::new(self.last_group_id)
    }

    fn group_id_by_code(&self, code: &GroupCode) -> Option<GroupId> {
        self.groups
            .iter()
            .find(|(_, group)| &group.code == code)
            .map(|(group_id, _)| *group_id)
    }

    fn remove_permission(&mut self, code: &PermissionCode) {
        self.permissions.remove(code);
        self.direct_grants.retain(|(_, granted), _| granted != code);
        for group in self.groups.values_mut() {
            group.permissions.remove(code);
        }
    }

    fn require_known_permissions(&self, permissions: &[PermissionCode]) -> AppResult<()> {
        match permissions
            .iter()
            .find(|permission| !self.permissions.contains_key(*permission))
        {
            Some(missing) => Err(AppError::NotFound(format!(
                "permission '{missing}' was not found"
            ))),
            None => Ok(()),
        }
    }

    fn reject_repeated_codes(permissions: &[PermissionCode], subject: &str) -> AppResult<()> {
        let mut seen = BTreeSet::new();
        match permissions.iter().find(|permission| !seen.insert(*permission)) {
            Some(repeated) => Err(AppError::Conflict(format!(
                "permission '{repeated}' appears twice in {subject}"
            ))),
            None => Ok(()),
        }
    }

    fn require_known_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            return Ok(());
        }

        Err(AppError::NotFound(format!("user '{user_id}' was not found")))
    }

    fn definition(&self, code: &PermissionCode) -> AppResult<PermissionDefinition> {
        self.permissions.get(code).cloned().ok_or_else(|| {
            AppError::Internal(format!("granted permission '{code}' is missing from the catalog"))
        })
    }

    fn group_definition(&self, group_id: GroupId, group: &StoredGroup) -> GroupDefinition {
        GroupDefinition {
            group_id,
            code: group.code.clone(),
            name: group.name.clone(),
            description: group.description.clone(),
            ownership: group.ownership,
            permissions: group.permissions.iter().cloned().collect(),
        }
    }

    fn member_groups(&self, user_id: UserId) -> impl Iterator<Item = (GroupId, &StoredGroup)> {
        self.memberships
            .keys()
            .filter(move |(member, _)| *member == user_id)
            .filter_map(|(_, group_id)| {
                self.groups.get(group_id).map(|group| (*group_id, group))
            })
    }
}

#[async_trait]
impl UserDirectory for InMemoryPermissionStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<AuthenticatedUser>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }
}

#[async_trait]
impl AuditRepository for InMemoryPermissionStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryPermissionStore {
    async fn load_permission_sources(&self, user_id: UserId) -> AppResult<PermissionSources> {
        self.load_permission_sources_impl(user_id).await
    }

    async fn load_grant_details(&self, user_id: UserId) -> AppResult<PermissionGrantDetails> {
        self.load_grant_details_impl(user_id).await
    }
}

#[async_trait]
impl PermissionAdminRepository for InMemoryPermissionStore {
    async fn list_permissions(&self) -> AppResult<Vec<PermissionDefinition>> {
        Ok(self.state.read().await.permissions.values().cloned().collect())
    }

    async fn find_permission(
        &self,
        permission: &PermissionCode,
    ) -> AppResult<Option<PermissionDefinition>> {
        Ok(self.state.read().await.permissions.get(permission).cloned())
    }

    async fn list_groups(&self, tenant_id: TenantId) -> AppResult<Vec<GroupDefinition>> {
        self.list_groups_impl(tenant_id).await
    }

    async fn find_group(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>> {
        let state = self.state.read().await;
        Ok(state
            .groups
            .get(&group_id)
            .map(|group| state.group_definition(group_id, group)))
    }

    async fn create_group(&self, group: NewGroup) -> AppResult<GroupDefinition> {
        self.create_group_impl(group).await
    }

    async fn delete_group(&self, group_id: GroupId) -> AppResult<()> {
        self.delete_group_impl(group_id).await
    }

    async fn attach_group_permissions(
        &self,
        group_id: GroupId,
        permissions: &[PermissionCode],
    ) -> AppResult<()> {
        self.attach_group_permissions_impl(group_id, permissions)
            .await
    }

    async fn detach_group_permission(
        &self,
        group_id: GroupId,
        permission: &PermissionCode,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .groups
            .get_mut(&group_id)
            .is_some_and(|group| group.permissions.remove(permission)))
    }

    async fn add_group_member(
        &self,
        group_id: GroupId,
        user_id: UserId,
        assigned_by: UserId,
    ) -> AppResult<()> {
        self.add_group_member_impl(group_id, user_id, assigned_by)
            .await
    }

    async fn remove_group_member(&self, group_id: GroupId, user_id: UserId) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .memberships
            .remove(&(user_id, group_id))
            .is_some())
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<GroupMembership>> {
        self.list_user_memberships_impl(user_id).await
    }

    async fn grant_user_permissions(
        &self,
        user_id: UserId,
        permissions: &[PermissionCode],
        audit: DirectGrantAudit,
    ) -> AppResult<()> {
        self.grant_user_permissions_impl(user_id, permissions, audit)
            .await
    }

    async fn revoke_user_permission(
        &self,
        user_id: UserId,
        permission: &PermissionCode,
    ) -> AppResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .direct_grants
            .remove(&(user_id, permission.clone()))
            .is_some())
    }
}

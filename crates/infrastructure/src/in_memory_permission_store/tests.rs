use std::sync::Arc;

use salesdesk_application::{
    AuthorizationRepository, AuthorizationService, DirectGrantAudit, NewGroup,
    PermissionAdminRepository, UserDirectory,
};
use salesdesk_core::{AppError, AuthenticatedUser, GroupId, TenantId, UserId};
use salesdesk_domain::{
    GroupCode, GroupOwnership, PermissionCode, PermissionRequirement, permission_catalog,
};

use super::InMemoryPermissionStore;

fn code(value: &str) -> PermissionCode {
    match PermissionCode::new(value) {
        Ok(code) => code,
        Err(error) => panic!("invalid test code '{value}': {error}"),
    }
}

fn group_code(value: &str) -> GroupCode {
    match GroupCode::new(value) {
        Ok(code) => code,
        Err(error) => panic!("invalid test group code '{value}': {error}"),
    }
}

fn tenant(value: i64) -> TenantId {
    match TenantId::new(value) {
        Ok(tenant_id) => tenant_id,
        Err(error) => panic!("invalid test tenant: {error}"),
    }
}

fn user(id: i64, tenant_id: TenantId) -> AuthenticatedUser {
    match UserId::new(id) {
        Ok(user_id) => AuthenticatedUser::new(user_id, format!("user {id}"), tenant_id),
        Err(error) => panic!("invalid test user: {error}"),
    }
}

fn audit(granted_by: &AuthenticatedUser) -> DirectGrantAudit {
    DirectGrantAudit {
        granted_by: granted_by.user_id(),
        reason: None,
    }
}

async fn seeded_store(users: &[&AuthenticatedUser]) -> Arc<InMemoryPermissionStore> {
    let store = Arc::new(InMemoryPermissionStore::new());
    assert!(store.sync_catalog().await.is_ok());
    for user in users {
        store.insert_user((*user).clone()).await;
    }
    store
}

async fn create_tenant_group(
    store: &InMemoryPermissionStore,
    tenant_id: TenantId,
    group: &str,
    permissions: &[&str],
) -> GroupId {
    let created = store
        .create_group(NewGroup {
            ownership: GroupOwnership::Tenant(tenant_id),
            code: group_code(group),
            name: group.to_owned(),
            description: None,
            permissions: permissions.iter().map(|value| code(value)).collect(),
        })
        .await;
    match created {
        Ok(group) => group.group_id,
        Err(error) => panic!("group creation failed: {error}"),
    }
}

#[tokio::test]
async fn catalog_sync_seeds_system_groups_and_is_idempotent() {
    let store = InMemoryPermissionStore::new();
    assert!(store.sync_catalog().await.is_ok());
    assert!(store.sync_catalog().await.is_ok());

    let catalog_size = permission_catalog().map(|catalog| catalog.len()).unwrap_or_default();
    let listed = store.list_permissions().await.unwrap_or_default();
    assert_eq!(listed.len(), catalog_size);

    let groups = store.list_groups(tenant(1)).await.unwrap_or_default();
    assert_eq!(
        groups.iter().map(|group| group.code.as_str()).collect::<Vec<_>>(),
        vec!["admin", "manager", "staff", "viewer"]
    );
    assert!(groups.iter().all(|group| group.ownership.is_system()));
    assert_eq!(groups[0].permissions.len(), catalog_size);
}

#[tokio::test]
async fn group_and_direct_grants_resolve_to_their_union() {
    let company = tenant(1);
    let admin = user(1, company);
    let alice = user(2, company);
    let store = seeded_store(&[&admin, &alice]).await;
    let group_id = create_tenant_group(&store, company, "branch_team", &["branch.view", "branch.update"]).await;

    assert!(store.add_group_member(group_id, alice.user_id(), admin.user_id()).await.is_ok());
    assert!(
        store
            .grant_user_permissions(alice.user_id(), &[code("branch.delete")], audit(&admin))
            .await
            .is_ok()
    );

    let authorization = AuthorizationService::new(store.clone());
    let resolved = authorization.resolve_permissions(alice.user_id()).await.unwrap_or_default();
    assert_eq!(
        resolved.iter().map(PermissionCode::as_str).collect::<Vec<_>>(),
        vec!["branch.delete", "branch.update", "branch.view"]
    );

    assert!(store.remove_group_member(group_id, alice.user_id()).await.unwrap_or_default());
    let resolved = authorization.resolve_permissions(alice.user_id()).await.unwrap_or_default();
    assert_eq!(
        resolved.iter().map(PermissionCode::as_str).collect::<Vec<_>>(),
        vec!["branch.delete"]
    );
}

#[tokio::test]
async fn attaching_to_a_group_reaches_every_member() {
    let company = tenant(1);
    let admin = user(1, company);
    let members = [user(2, company), user(3, company), user(4, company)];
    let store = seeded_store(&[&admin, &members[0], &members[1], &members[2]]).await;
    let group_id = create_tenant_group(&store, company, "reporting", &["report.view_all"]).await;
    for member in &members {
        assert!(store.add_group_member(group_id, member.user_id(), admin.user_id()).await.is_ok());
    }

    assert!(
        store
            .attach_group_permissions(group_id, &[code("report.approve")])
            .await
            .is_ok()
    );

    let authorization = AuthorizationService::new(store.clone());
    let approve = PermissionRequirement::single(code("report.approve"));
    for member in &members {
        assert!(authorization.check(member.user_id(), &approve).await.is_allowed());
    }

    assert!(store.delete_group(group_id).await.is_ok());
    for member in &members {
        assert!(!authorization.check(member.user_id(), &approve).await.is_allowed());
        let memberships = store.list_user_memberships(member.user_id()).await.unwrap_or_default();
        assert!(memberships.is_empty());
    }
}

#[tokio::test]
async fn duplicate_pairs_conflict_and_batches_apply_all_or_nothing() {
    let company = tenant(1);
    let admin = user(1, company);
    let alice = user(2, company);
    let store = seeded_store(&[&admin, &alice]).await;
    let group_id = create_tenant_group(&store, company, "support", &["customer.view"]).await;

    assert!(store.add_group_member(group_id, alice.user_id(), admin.user_id()).await.is_ok());
    assert!(matches!(
        store.add_group_member(group_id, alice.user_id(), admin.user_id()).await,
        Err(AppError::Conflict(_))
    ));

    assert!(matches!(
        store
            .attach_group_permissions(group_id, &[code("customer.update"), code("customer.view")])
            .await,
        Err(AppError::Conflict(_))
    ));

    assert!(
        store
            .grant_user_permissions(alice.user_id(), &[code("report.view_all")], audit(&admin))
            .await
            .is_ok()
    );
    assert!(matches!(
        store
            .grant_user_permissions(
                alice.user_id(),
                &[code("report.approve"), code("report.view_all")],
                audit(&admin),
            )
            .await,
        Err(AppError::Conflict(_))
    ));

    let sources = store.load_permission_sources(alice.user_id()).await.unwrap_or_default();
    assert_eq!(sources.direct, vec![code("report.view_all")]);
    assert_eq!(sources.via_groups, vec![code("customer.view")]);
}

#[tokio::test]
async fn unknown_codes_and_users_are_not_found() {
    let company = tenant(1);
    let admin = user(1, company);
    let store = seeded_store(&[&admin]).await;
    let group_id = create_tenant_group(&store, company, "sales", &[]).await;

    assert!(matches!(
        store
            .attach_group_permissions(group_id, &[code("branch.view"), code("spaceship.fly")])
            .await,
        Err(AppError::NotFound(_))
    ));
    let group = store.find_group(group_id).await.unwrap_or_default();
    assert!(group.is_some_and(|group| group.permissions.is_empty()));

    let Ok(ghost) = UserId::new(404) else {
        panic!("valid user id was rejected");
    };
    assert!(matches!(
        store.add_group_member(group_id, ghost, admin.user_id()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        store
            .grant_user_permissions(ghost, &[code("branch.view")], audit(&admin))
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn removing_absent_pairs_reports_nothing_removed() {
    let company = tenant(1);
    let admin = user(1, company);
    let store = seeded_store(&[&admin]).await;
    let group_id = create_tenant_group(&store, company, "sales", &["branch.view"]).await;

    assert!(matches!(
        store.revoke_user_permission(admin.user_id(), &code("branch.view")).await,
        Ok(false)
    ));
    assert!(matches!(
        store.remove_group_member(group_id, admin.user_id()).await,
        Ok(false)
    ));
    assert!(matches!(
        store.detach_group_permission(group_id, &code("branch.delete")).await,
        Ok(false)
    ));
    assert!(matches!(
        store.detach_group_permission(group_id, &code("branch.view")).await,
        Ok(true)
    ));
}

#[tokio::test]
async fn deleting_a_user_cascades_assignments_and_clears_grantor() {
    let company = tenant(1);
    let admin = user(1, company);
    let alice = user(2, company);
    let store = seeded_store(&[&admin, &alice]).await;
    let Some(viewer) = store.find_group_id(&group_code("viewer")).await else {
        panic!("viewer system group was not seeded");
    };

    assert!(store.add_group_member(viewer, alice.user_id(), admin.user_id()).await.is_ok());
    assert!(store.add_group_member(viewer, admin.user_id(), admin.user_id()).await.is_ok());
    assert!(
        store
            .grant_user_permissions(
                alice.user_id(),
                &[code("report.approve")],
                DirectGrantAudit {
                    granted_by: admin.user_id(),
                    reason: Some("quarter close".to_owned()),
                },
            )
            .await
            .is_ok()
    );

    store.remove_user(admin.user_id()).await;

    assert!(matches!(store.find_user(admin.user_id()).await, Ok(None)));
    let details = store.load_grant_details(alice.user_id()).await.unwrap_or_default();
    assert_eq!(details.direct.len(), 1);
    assert_eq!(details.direct[0].granted_by, None);
    assert_eq!(details.direct[0].reason.as_deref(), Some("quarter close"));

    let memberships = store.list_user_memberships(alice.user_id()).await.unwrap_or_default();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].assigned_by, None);

    let admin_sources = store.load_permission_sources(admin.user_id()).await.unwrap_or_default();
    assert!(admin_sources.direct.is_empty());
    assert!(admin_sources.via_groups.is_empty());
}

#[tokio::test]
async fn tenant_groups_are_listed_only_for_their_owner() {
    let left = tenant(1);
    let right = tenant(2);
    let left_admin = user(1, left);
    let right_admin = user(2, right);
    let store = seeded_store(&[&left_admin, &right_admin]).await;
    create_tenant_group(&store, left, "left_team", &[]).await;
    create_tenant_group(&store, right, "right_team", &[]).await;

    let listed = store.list_groups(left).await.unwrap_or_default();
    let codes: Vec<&str> = listed.iter().map(|group| group.code.as_str()).collect();
    assert!(codes.contains(&"left_team"));
    assert!(!codes.contains(&"right_team"));
    assert!(codes.contains(&"admin"));

    assert!(matches!(
        store
            .create_group(NewGroup {
                ownership: GroupOwnership::Tenant(right),
                code: group_code("left_team"),
                name: "Duplicate".to_owned(),
                description: None,
                permissions: Vec::new(),
            })
            .await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn registered_companies_own_groups_before_their_first_user() {
    let store = seeded_store(&[]).await;
    let fresh = tenant(7);

    assert!(matches!(
        store
            .create_group(NewGroup {
                ownership: GroupOwnership::Tenant(fresh),
                code: group_code("early_team"),
                name: "Early".to_owned(),
                description: None,
                permissions: Vec::new(),
            })
            .await,
        Err(AppError::NotFound(_))
    ));

    store.insert_tenant(fresh).await;
    let group_id = create_tenant_group(&store, fresh, "early_team", &["branch.view"]).await;

    let departed = user(9, tenant(8));
    store.insert_user(departed.clone()).await;
    store.remove_user(departed.user_id()).await;
    create_tenant_group(&store, tenant(8), "late_team", &[]).await;

    let listed = store.list_groups(fresh).await.unwrap_or_default();
    assert!(listed.iter().any(|group| group.group_id == group_id));
}

#[tokio::test]
async fn catalog_lookup_finds_only_seeded_codes() {
    let store = seeded_store(&[]).await;

    let found = store.find_permission(&code("report.approve")).await;
    assert!(matches!(found, Ok(Some(ref definition)) if definition.resource_type == "report"));
    assert!(matches!(
        store.find_permission(&code("nosuch.thing")).await,
        Ok(None)
    ));
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use proptest::prelude::*;
use salesdesk_core::{AppError, AppResult, AuthenticatedUser, GroupId, TenantId, UserId};
use salesdesk_domain::{
    GroupCode, PermissionCode, PermissionDefinition, PermissionRequirement,
};
use tokio::sync::Mutex;

use crate::{
    AuthorizationRepository, DirectPermissionGrant, GroupPermissionGrant, PermissionGrantDetails,
    PermissionSources,
};

use super::{AccessDecision, AuthorizationService, Denial};

fn code(value: &str) -> PermissionCode {
    match PermissionCode::new(value) {
        Ok(code) => code,
        Err(error) => panic!("invalid test code '{value}': {error}"),
    }
}

fn user_id(value: i64) -> UserId {
    match UserId::new(value) {
        Ok(user_id) => user_id,
        Err(error) => panic!("invalid test user id: {error}"),
    }
}

fn definition(value: &str) -> PermissionDefinition {
    let code = code(value);
    PermissionDefinition {
        resource_type: code.resource_type().to_owned(),
        name: value.to_owned(),
        description: None,
        code,
    }
}

#[derive(Default)]
struct FakeAuthorizationRepository {
    direct: Mutex<HashMap<UserId, Vec<PermissionCode>>>,
    groups: Mutex<HashMap<UserId, Vec<(i64, &'static str, Vec<PermissionCode>)>>>,
    failing: bool,
}

impl FakeAuthorizationRepository {
    async fn grant_direct(&self, user_id: UserId, values: &[&str]) {
        self.direct
            .lock()
            .await
            .entry(user_id)
            .or_default()
            .extend(values.iter().map(|value| code(value)));
    }

    async fn join_group(&self, user_id: UserId, group_id: i64, group_code: &'static str, values: &[&str]) {
        self.groups.lock().await.entry(user_id).or_default().push((
            group_id,
            group_code,
            values.iter().map(|value| code(value)).collect(),
        ));
    }

    async fn leave_groups(&self, user_id: UserId) {
        self.groups.lock().await.remove(&user_id);
    }
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn load_permission_sources(&self, user_id: UserId) -> AppResult<PermissionSources> {
        if self.failing {
            return Err(AppError::Internal("connection refused".to_owned()));
        }

        Ok(PermissionSources {
            direct: self
                .direct
                .lock()
                .await
                .get(&user_id)
                .cloned()
                .unwrap_or_default(),
            via_groups: self
                .groups
                .lock()
                .await
                .get(&user_id)
                .map(|groups| {
                    groups
                        .iter()
                        .flat_map(|(_, _, codes)| codes.iter().cloned())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    async fn load_grant_details(&self, user_id: UserId) -> AppResult<PermissionGrantDetails> {
        let direct = self
            .direct
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|code| DirectPermissionGrant {
                permission: definition(code.as_str()),
                granted_by: UserId::new(1).ok(),
                granted_at: Utc::now(),
                reason: Some("on-call cover".to_owned()),
            })
            .collect();

        let mut via_groups = Vec::new();
        for (group_id, group_code, codes) in self
            .groups
            .lock()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
        {
            for code in codes {
                via_groups.push(GroupPermissionGrant {
                    permission: definition(code.as_str()),
                    group_id: GroupId::new(group_id)?,
                    group_code: GroupCode::new(group_code)?,
                    group_name: group_code.to_owned(),
                });
            }
        }

        Ok(PermissionGrantDetails { direct, via_groups })
    }
}

async fn branch_scenario() -> (Arc<FakeAuthorizationRepository>, AuthorizationService, UserId) {
    let repository = Arc::new(FakeAuthorizationRepository::default());
    let user = user_id(10);
    repository
        .join_group(user, 1, "branch_team", &["branch.view", "branch.update"])
        .await;
    repository.grant_direct(user, &["branch.delete"]).await;

    let service = AuthorizationService::new(repository.clone());
    (repository, service, user)
}

#[tokio::test]
async fn resolve_unions_direct_and_group_grants() {
    let (_, service, user) = branch_scenario().await;

    let permissions = service.resolve_permissions(user).await;
    assert!(permissions.is_ok());
    let codes: Vec<String> = permissions
        .unwrap_or_default()
        .iter()
        .map(|code| code.as_str().to_owned())
        .collect();
    assert_eq!(codes, vec!["branch.delete", "branch.update", "branch.view"]);
}

#[tokio::test]
async fn permission_held_through_both_paths_is_counted_once() {
    let repository = Arc::new(FakeAuthorizationRepository::default());
    let user = user_id(3);
    repository.grant_direct(user, &["report.view_all"]).await;
    repository
        .join_group(user, 1, "managers", &["report.view_all", "report.approve"])
        .await;
    repository
        .join_group(user, 2, "auditors", &["report.view_all"])
        .await;
    let service = AuthorizationService::new(repository);

    let permissions = service.resolve_permissions(user).await.unwrap_or_default();
    assert_eq!(permissions.len(), 2);
}

#[tokio::test]
async fn unknown_user_resolves_to_empty_set() {
    let service = AuthorizationService::new(Arc::new(FakeAuthorizationRepository::default()));

    let permissions = service.resolve_permissions(user_id(999)).await;
    assert!(permissions.is_ok());
    assert!(permissions.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn gate_applies_all_and_any_modes() {
    let (_, service, user) = branch_scenario().await;

    let all = PermissionRequirement::all([code("branch.view"), code("branch.delete")]);
    assert_eq!(service.check(user, &all).await, AccessDecision::Allow);

    let any = PermissionRequirement::any([code("branch.create")]);
    assert!(!service.check(user, &any).await.is_allowed());

    let mixed_all = PermissionRequirement::all([code("branch.view"), code("branch.create")]);
    let mixed_any = PermissionRequirement::any([code("branch.view"), code("branch.create")]);
    assert!(!service.check(user, &mixed_all).await.is_allowed());
    assert!(service.check(user, &mixed_any).await.is_allowed());
}

#[tokio::test]
async fn fresh_user_is_denied_except_for_empty_requirements() {
    let service = AuthorizationService::new(Arc::new(FakeAuthorizationRepository::default()));
    let user = user_id(5);

    assert!(
        !service
            .check(user, &PermissionRequirement::single(code("user.view")))
            .await
            .is_allowed()
    );
    assert!(
        service
            .check(user, &PermissionRequirement::authenticated())
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn revoked_group_membership_takes_effect_on_next_check() {
    let (repository, service, user) = branch_scenario().await;
    let view = PermissionRequirement::single(code("branch.view"));
    assert!(service.check(user, &view).await.is_allowed());

    repository.leave_groups(user).await;

    let remaining = service.resolve_permissions(user).await.unwrap_or_default();
    assert_eq!(
        remaining.iter().map(PermissionCode::as_str).collect::<Vec<_>>(),
        vec!["branch.delete"]
    );
    assert!(!service.check(user, &view).await.is_allowed());
    assert!(
        !service
            .check(user, &PermissionRequirement::single(code("branch.update")))
            .await
            .is_allowed()
    );
}

#[tokio::test]
async fn require_reports_only_required_codes_on_denial() {
    let (_, service, user) = branch_scenario().await;
    let Ok(tenant_id) = TenantId::new(1) else {
        panic!("valid tenant id was rejected");
    };
    let actor = AuthenticatedUser::new(user, "Alice", tenant_id);

    let result = service
        .require(&actor, &PermissionRequirement::single(code("customer.delete")))
        .await;

    match result {
        Err(AppError::Forbidden(message)) => {
            assert!(message.contains("customer.delete"));
            assert!(!message.contains("branch.view"));
            assert!(!message.contains("branch.delete"));
        }
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn resolution_failure_denies_and_is_reported_as_internal() {
    let repository = Arc::new(FakeAuthorizationRepository {
        failing: true,
        ..FakeAuthorizationRepository::default()
    });
    let service = AuthorizationService::new(repository);
    let user = user_id(8);
    let requirement = PermissionRequirement::single(code("user.view"));

    assert_eq!(
        service.check(user, &requirement).await,
        AccessDecision::Deny(Denial::ResolutionUnavailable)
    );

    let Ok(tenant_id) = TenantId::new(1) else {
        panic!("valid tenant id was rejected");
    };
    let actor = AuthenticatedUser::new(user, "Bob", tenant_id);
    assert!(matches!(
        service.require(&actor, &requirement).await,
        Err(AppError::Internal(_))
    ));
    assert!(service.has_permission(user, &code("user.view")).await.is_err());
}

#[tokio::test]
async fn has_permission_answers_inline_membership_questions() {
    let (_, service, user) = branch_scenario().await;

    assert!(matches!(
        service.has_permission(user, &code("branch.update")).await,
        Ok(true)
    ));
    assert!(matches!(
        service.has_permission(user, &code("report.view_all")).await,
        Ok(false)
    ));
}

#[tokio::test]
async fn describe_permissions_merges_paths_per_code() {
    let repository = Arc::new(FakeAuthorizationRepository::default());
    let user = user_id(4);
    repository.grant_direct(user, &["branch.view"]).await;
    repository
        .join_group(user, 2, "viewers", &["branch.view", "company.view"])
        .await;
    repository
        .join_group(user, 1, "admins", &["branch.view"])
        .await;
    let service = AuthorizationService::new(repository);

    let described = service.describe_permissions(user).await.unwrap_or_default();
    assert_eq!(described.len(), 2);

    let branch_view = &described[0];
    assert_eq!(branch_view.permission.code.as_str(), "branch.view");
    assert!(branch_view.direct.is_some());
    assert_eq!(
        branch_view
            .groups
            .iter()
            .map(|group| group.code.as_str())
            .collect::<Vec<_>>(),
        vec!["admins", "viewers"]
    );

    let company_view = &described[1];
    assert!(company_view.direct.is_none());
    assert_eq!(company_view.groups.len(), 1);
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(error) => panic!("failed to build test runtime: {error}"),
    }
}

proptest! {
    #[test]
    fn resolved_set_is_exactly_the_union_of_both_paths(
        direct in proptest::collection::btree_set("[a-d]\\.[v-z]", 0..8),
        group_one in proptest::collection::btree_set("[a-d]\\.[v-z]", 0..8),
        group_two in proptest::collection::btree_set("[a-d]\\.[v-z]", 0..8),
    ) {
        let runtime = runtime();
        let resolved = runtime.block_on(async {
            let repository = Arc::new(FakeAuthorizationRepository::default());
            let user = user_id(1);
            let direct: Vec<&str> = direct.iter().map(String::as_str).collect();
            let group_one: Vec<&str> = group_one.iter().map(String::as_str).collect();
            let group_two: Vec<&str> = group_two.iter().map(String::as_str).collect();
            repository.grant_direct(user, &direct).await;
            repository.join_group(user, 1, "first", &group_one).await;
            repository.join_group(user, 2, "second", &group_two).await;

            AuthorizationService::new(repository)
                .resolve_permissions(user)
                .await
                .unwrap_or_default()
        });

        let expected: std::collections::BTreeSet<String> = direct
            .union(&group_one)
            .cloned()
            .collect::<std::collections::BTreeSet<_>>()
            .union(&group_two)
            .cloned()
            .collect();
        let actual: std::collections::BTreeSet<String> = resolved
            .iter()
            .map(|code| code.as_str().to_owned())
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

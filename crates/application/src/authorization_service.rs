use std::sync::Arc;

use salesdesk_core::{AppResult, AuthenticatedUser, UserId};
use salesdesk_domain::{AdminPermission, EffectivePermissions, PermissionCode, PermissionRequirement};
use tracing::{debug, error, warn};

use crate::AuthorizationRepository;

mod decision;
mod provenance;

#[cfg(test)]
mod tests;

pub use decision::{AccessDecision, Denial};
pub use provenance::{DirectGrantSource, GroupSource, PermissionProvenance};

/// Application service resolving effective permissions and gating operations.
///
/// Resolution is never cached: every call re-reads the assignment store so
/// grants and revocations apply to the very next request.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Resolves the user's effective permissions: direct grants ∪ group grants.
    ///
    /// Unknown users and users without assignments resolve to the empty set.
    pub async fn resolve_permissions(&self, user_id: UserId) -> AppResult<EffectivePermissions> {
        let sources = self.repository.load_permission_sources(user_id).await?;
        Ok(EffectivePermissions::from_sources(
            sources.direct,
            sources.via_groups,
        ))
    }

    /// Evaluates a requirement for a user and never fails.
    ///
    /// A resolution failure is logged and treated as a denial.
    pub async fn check(&self, user_id: UserId, requirement: &PermissionRequirement) -> AccessDecision {
        if requirement.codes().is_empty() {
            return AccessDecision::Allow;
        }

        match self.resolve_permissions(user_id).await {
            Ok(permissions) if requirement.is_satisfied_by(&permissions) => {
                debug!(user_id = %user_id, required = %requirement.describe(), "access allowed");
                AccessDecision::Allow
            }
            Ok(_) => {
                warn!(user_id = %user_id, required = %requirement.describe(), "access denied");
                AccessDecision::Deny(Denial::MissingPermissions(requirement.clone()))
            }
            Err(resolution_error) => {
                error!(
                    user_id = %user_id,
                    required = %requirement.describe(),
                    error = %resolution_error,
                    "permission resolution failed, denying access"
                );
                AccessDecision::Deny(Denial::ResolutionUnavailable)
            }
        }
    }

    /// Ensures the user satisfies the requirement before an operation runs.
    ///
    /// Missing permissions surface as `Forbidden`; resolution failures as
    /// `Internal`, so callers can tell an outage from a denial.
    pub async fn require(
        &self,
        user: &AuthenticatedUser,
        requirement: &PermissionRequirement,
    ) -> AppResult<()> {
        match self.check(user.user_id(), requirement).await {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(denial) => Err(denial.into_error()),
        }
    }

    /// Ensures the user holds one administrative permission.
    pub async fn require_admin_permission(
        &self,
        user: &AuthenticatedUser,
        permission: AdminPermission,
    ) -> AppResult<()> {
        self.require(user, &PermissionRequirement::single(permission.code()))
            .await
    }

    /// Returns whether the user currently holds the permission.
    pub async fn has_permission(&self, user_id: UserId, code: &PermissionCode) -> AppResult<bool> {
        Ok(self.resolve_permissions(user_id).await?.contains(code))
    }
}

use salesdesk_core::AppError;
use salesdesk_domain::PermissionRequirement;

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The operation may proceed.
    Allow,
    /// The operation must not run.
    Deny(Denial),
}

impl AccessDecision {
    /// Returns whether the decision allows the operation.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Why a gate evaluation denied access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The effective set does not satisfy the requirement.
    MissingPermissions(PermissionRequirement),
    /// Permissions could not be resolved; access is denied fail-closed.
    ResolutionUnavailable,
}

impl Denial {
    /// Caller-facing message naming only the required permissions.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::MissingPermissions(requirement) => {
                format!("this operation requires {}", requirement.describe())
            }
            Self::ResolutionUnavailable => {
                "permissions could not be verified; access denied".to_owned()
            }
        }
    }

    /// Converts the denial into the matching application error.
    #[must_use]
    pub fn into_error(self) -> AppError {
        let message = self.message();
        match self {
            Self::MissingPermissions(_) => AppError::Forbidden(message),
            Self::ResolutionUnavailable => AppError::Internal(message),
        }
    }
}

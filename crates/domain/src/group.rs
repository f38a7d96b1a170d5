use std::fmt::{Display, Formatter};

use salesdesk_core::{AppError, AppResult, TenantId};
use serde::{Deserialize, Serialize};

const GROUP_CODE_MAX_LENGTH: usize = 100;

/// Unique group code, e.g. `branch_managers`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupCode(String);

impl GroupCode {
    /// Parses and validates a group code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let value = value.trim().to_owned();

        if value.is_empty() || value.len() > GROUP_CODE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "group code must be between 1 and {GROUP_CODE_MAX_LENGTH} characters"
            )));
        }

        if !value
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
        {
            return Err(AppError::Validation(format!(
                "group code '{value}' may only contain lowercase letters, digits and '_'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for GroupCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupCode> for String {
    fn from(value: GroupCode) -> Self {
        value.0
    }
}

impl Display for GroupCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Who owns a group: the whole system, or exactly one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "tenant_id")]
pub enum GroupOwnership {
    /// Seeded, system-wide group with no owning tenant.
    System,
    /// Group created and edited by one tenant's administrators.
    Tenant(TenantId),
}

impl GroupOwnership {
    /// Rebuilds ownership from its storage columns.
    pub fn from_storage(is_system: bool, owning_tenant: Option<TenantId>) -> AppResult<Self> {
        match (is_system, owning_tenant) {
            (true, None) => Ok(Self::System),
            (false, Some(tenant_id)) => Ok(Self::Tenant(tenant_id)),
            (true, Some(tenant_id)) => Err(AppError::Validation(format!(
                "system group must not be owned by tenant '{tenant_id}'"
            ))),
            (false, None) => Err(AppError::Validation(
                "tenant group must have an owning tenant".to_owned(),
            )),
        }
    }

    /// Returns whether the group is system-managed.
    #[must_use]
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns the owning tenant for tenant groups.
    #[must_use]
    pub fn owning_tenant(&self) -> Option<TenantId> {
        match self {
            Self::System => None,
            Self::Tenant(tenant_id) => Some(*tenant_id),
        }
    }

    /// Returns whether a tenant may see and use this group.
    #[must_use]
    pub fn is_visible_to(&self, tenant_id: TenantId) -> bool {
        match self {
            Self::System => true,
            Self::Tenant(owner) => *owner == tenant_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use salesdesk_core::TenantId;

    use super::{GroupCode, GroupOwnership};

    #[test]
    fn ownership_rejects_inconsistent_storage_pairs() {
        let tenant_id = TenantId::new(7).ok();
        assert!(GroupOwnership::from_storage(true, tenant_id).is_err());
        assert!(GroupOwnership::from_storage(false, None).is_err());
        assert_eq!(
            GroupOwnership::from_storage(true, None).ok(),
            Some(GroupOwnership::System)
        );
    }

    #[test]
    fn tenant_groups_are_only_visible_to_their_owner() {
        let (Ok(owner), Ok(other)) = (TenantId::new(1), TenantId::new(2)) else {
            panic!("valid tenant ids were rejected");
        };

        let ownership = GroupOwnership::Tenant(owner);
        assert!(ownership.is_visible_to(owner));
        assert!(!ownership.is_visible_to(other));
        assert!(GroupOwnership::System.is_visible_to(other));
    }

    #[test]
    fn group_code_is_trimmed_and_validated() {
        assert_eq!(
            GroupCode::new("  sales_team ").ok().map(String::from),
            Some("sales_team".to_owned())
        );
        assert!(GroupCode::new("Sales Team").is_err());
        assert!(GroupCode::new("   ").is_err());
    }
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use salesdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const PERMISSION_CODE_MAX_LENGTH: usize = 100;

/// Atomic capability code in `<resource>.<action>` form, e.g. `report.view_all`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionCode(String);

impl PermissionCode {
    /// Parses and validates a permission code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.len() > PERMISSION_CODE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission code must be at most {PERMISSION_CODE_MAX_LENGTH} characters"
            )));
        }

        let Some((resource, action)) = value.split_once('.') else {
            return Err(AppError::Validation(format!(
                "permission code '{value}' must have the form '<resource>.<action>'"
            )));
        };

        if !is_code_segment(resource) || !is_code_segment(action) {
            return Err(AppError::Validation(format!(
                "permission code '{value}' may only contain lowercase letters, digits and '_' around a single '.'"
            )));
        }

        Ok(Self(value))
    }

    /// Wraps a compile-time code whose validity is asserted by tests.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the resource segment of the code.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.0
            .split_once('.')
            .map(|(resource, _)| resource)
            .unwrap_or(self.0.as_str())
    }

    /// Parses a transport value into a permission code.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

fn is_code_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_')
}

impl FromStr for PermissionCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionCode> for String {
    fn from(value: PermissionCode) -> Self {
        value.0
    }
}

impl Display for PermissionCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Immutable catalog entry describing one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Unique permission code.
    pub code: PermissionCode,
    /// Human-readable name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Resource the permission applies to.
    pub resource_type: String,
}

/// Stable audit actions emitted by permission administration use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A permission was granted directly to a user.
    PermissionGranted,
    /// A direct permission grant was revoked.
    PermissionRevoked,
    /// A tenant group was created.
    GroupCreated,
    /// A tenant group was deleted.
    GroupDeleted,
    /// A permission was attached to a group.
    GroupPermissionAttached,
    /// A permission was detached from a group.
    GroupPermissionDetached,
    /// A user was added to a group.
    GroupMemberAdded,
    /// A user was removed from a group.
    GroupMemberRemoved,
    /// The permission catalog was synchronized at startup.
    PermissionCatalogSynchronized,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionGranted => "permission.granted",
            Self::PermissionRevoked => "permission.revoked",
            Self::GroupCreated => "group.created",
            Self::GroupDeleted => "group.deleted",
            Self::GroupPermissionAttached => "group.permission_attached",
            Self::GroupPermissionDetached => "group.permission_detached",
            Self::GroupMemberAdded => "group.member_added",
            Self::GroupMemberRemoved => "group.member_removed",
            Self::PermissionCatalogSynchronized => "permission.catalog_synchronized",
        }
    }
}

/// Kind of record an audit event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResource {
    /// A permission group; the resource id is the group id.
    PermissionGroup,
    /// A group's permission bundle.
    GroupPermission,
    /// A user's group membership.
    UserGroupAssignment,
    /// A permission granted directly to a user.
    UserPermissionAssignment,
}

impl AuditResource {
    /// Returns the stored resource type label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionGroup => "permission_group",
            Self::GroupPermission => "group_permission",
            Self::UserGroupAssignment => "user_group_assignment",
            Self::UserPermissionAssignment => "user_permission_assignment",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::PermissionCode;

    #[test]
    fn permission_code_roundtrip_storage_value() {
        let Ok(code) = PermissionCode::new("report.view_all") else {
            panic!("well-formed code was rejected");
        };
        let restored = PermissionCode::from_str(code.as_str());
        assert!(restored.is_ok());
        assert_eq!(restored.ok(), Some(code.clone()));
        assert_eq!(code.resource_type(), "report");
    }

    #[test]
    fn malformed_permission_codes_are_rejected() {
        for value in [
            "",
            "report",
            "report.",
            ".view",
            "Report.view",
            "report.view.all",
            "report view",
        ] {
            assert!(PermissionCode::new(value).is_err(), "{value} was accepted");
        }
    }

    proptest! {
        #[test]
        fn well_formed_codes_are_accepted(resource in "[a-z_][a-z0-9_]{0,20}", action in "[a-z0-9_]{1,20}") {
            let value = format!("{resource}.{action}");
            let code = PermissionCode::new(value.clone());
            prop_assert!(code.is_ok());
            prop_assert_eq!(code.map(|code| code.resource_type().to_owned()).ok(), Some(resource));
        }
    }
}

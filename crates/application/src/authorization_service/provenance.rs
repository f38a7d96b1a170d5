use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use salesdesk_core::{AppResult, GroupId, UserId};
use salesdesk_domain::{GroupCode, PermissionCode, PermissionDefinition};

use crate::{DirectPermissionGrant, GroupPermissionGrant};

use super::AuthorizationService;

/// Direct grant details shown next to a resolved permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectGrantSource {
    /// Administrator that granted the permission.
    pub granted_by: Option<UserId>,
    /// Grant timestamp.
    pub granted_at: DateTime<Utc>,
    /// Optional grant reason.
    pub reason: Option<String>,
}

/// Group through which a permission is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSource {
    /// Group identifier.
    pub group_id: GroupId,
    /// Group code.
    pub code: GroupCode,
    /// Group display name.
    pub name: String,
}

/// One resolved permission annotated with every path that grants it.
///
/// Display only: the gate decides on the effective set, never on provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionProvenance {
    /// Catalog entry.
    pub permission: PermissionDefinition,
    /// Direct grant, when present.
    pub direct: Option<DirectGrantSource>,
    /// Groups granting the permission, ordered by code.
    pub groups: Vec<GroupSource>,
}

impl AuthorizationService {
    /// Returns the resolved set annotated with provenance, ordered by code.
    pub async fn describe_permissions(&self, user_id: UserId) -> AppResult<Vec<PermissionProvenance>> {
        let details = self.repository.load_grant_details(user_id).await?;
        Ok(merge_provenance(details.direct, details.via_groups))
    }
}

fn merge_provenance(
    direct: Vec<DirectPermissionGrant>,
    via_groups: Vec<GroupPermissionGrant>,
) -> Vec<PermissionProvenance> {
    let mut by_code: BTreeMap<PermissionCode, PermissionProvenance> = BTreeMap::new();

    for grant in direct {
        let entry = by_code
            .entry(grant.permission.code.clone())
            .or_insert_with(|| PermissionProvenance {
                permission: grant.permission.clone(),
                direct: None,
                groups: Vec::new(),
            });
        entry.direct = Some(DirectGrantSource {
            granted_by: grant.granted_by,
            granted_at: grant.granted_at,
            reason: grant.reason,
        });
    }

    for grant in via_groups {
        let entry = by_code
            .entry(grant.permission.code.clone())
            .or_insert_with(|| PermissionProvenance {
                permission: grant.permission.clone(),
                direct: None,
                groups: Vec::new(),
            });

        if entry.groups.iter().all(|group| group.group_id != grant.group_id) {
            entry.groups.push(GroupSource {
                group_id: grant.group_id,
                code: grant.group_code,
                name: grant.group_name,
            });
        }
    }

    by_code
        .into_values()
        .map(|mut provenance| {
            provenance
                .groups
                .sort_by(|left, right| left.code.cmp(&right.code));
            provenance
        })
        .collect()
}

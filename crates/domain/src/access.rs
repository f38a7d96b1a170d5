use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::security::PermissionCode;

/// Effective permission set: the deduplicated union of every grant path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissions(BTreeSet<PermissionCode>);

impl EffectivePermissions {
    /// Unions direct grants with group-derived grants.
    #[must_use]
    pub fn from_sources(
        direct: impl IntoIterator<Item = PermissionCode>,
        via_groups: impl IntoIterator<Item = PermissionCode>,
    ) -> Self {
        Self(direct.into_iter().chain(via_groups).collect())
    }

    /// Returns whether the set contains a code.
    #[must_use]
    pub fn contains(&self, code: &PermissionCode) -> bool {
        self.0.contains(code)
    }

    /// Returns the number of distinct codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no permission is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates codes in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &PermissionCode> {
        self.0.iter()
    }

    /// Consumes the set into its ordered codes.
    #[must_use]
    pub fn into_codes(self) -> BTreeSet<PermissionCode> {
        self.0
    }
}

impl FromIterator<PermissionCode> for EffectivePermissions {
    fn from_iter<T: IntoIterator<Item = PermissionCode>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How a list of required permissions is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementMode {
    /// Every listed permission must be held.
    #[default]
    All,
    /// At least one listed permission must be held.
    Any,
}

impl RequirementMode {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

/// Permission requirement declared by one protected operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionRequirement {
    codes: Vec<PermissionCode>,
    mode: RequirementMode,
}

impl PermissionRequirement {
    /// Creates a requirement from codes and a matching mode.
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = PermissionCode>, mode: RequirementMode) -> Self {
        let mut codes: Vec<PermissionCode> = codes.into_iter().collect();
        codes.sort();
        codes.dedup();
        Self { codes, mode }
    }

    /// Requires every listed permission.
    #[must_use]
    pub fn all(codes: impl IntoIterator<Item = PermissionCode>) -> Self {
        Self::new(codes, RequirementMode::All)
    }

    /// Requires at least one listed permission.
    #[must_use]
    pub fn any(codes: impl IntoIterator<Item = PermissionCode>) -> Self {
        Self::new(codes, RequirementMode::Any)
    }

    /// Requires a single permission.
    #[must_use]
    pub fn single(code: PermissionCode) -> Self {
        Self::all([code])
    }

    /// Requires nothing beyond authentication.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::all([])
    }

    /// Returns the required codes.
    #[must_use]
    pub fn codes(&self) -> &[PermissionCode] {
        self.codes.as_slice()
    }

    /// Returns the matching mode.
    #[must_use]
    pub fn mode(&self) -> RequirementMode {
        self.mode
    }

    /// Evaluates the requirement against an effective set.
    ///
    /// An empty requirement is satisfied by any authenticated user.
    #[must_use]
    pub fn is_satisfied_by(&self, permissions: &EffectivePermissions) -> bool {
        if self.codes.is_empty() {
            return true;
        }

        match self.mode {
            RequirementMode::All => self.codes.iter().all(|code| permissions.contains(code)),
            RequirementMode::Any => self.codes.iter().any(|code| permissions.contains(code)),
        }
    }

    /// Describes the requirement without referring to what the user holds.
    #[must_use]
    pub fn describe(&self) -> String {
        let codes = self
            .codes
            .iter()
            .map(PermissionCode::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        match (self.mode, self.codes.len()) {
            (_, 0) => "authentication".to_owned(),
            (_, 1) => format!("permission '{codes}'"),
            (RequirementMode::All, _) => format!("all of permissions [{codes}]"),
            (RequirementMode::Any, _) => format!("any of permissions [{codes}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{EffectivePermissions, PermissionRequirement};
    use crate::PermissionCode;

    fn code(value: &str) -> PermissionCode {
        match PermissionCode::new(value) {
            Ok(code) => code,
            Err(error) => panic!("invalid test code '{value}': {error}"),
        }
    }

    fn held(values: &[&str]) -> EffectivePermissions {
        values.iter().map(|value| code(value)).collect()
    }

    #[test]
    fn union_deduplicates_codes_granted_through_both_paths() {
        let permissions = EffectivePermissions::from_sources(
            [code("branch.delete"), code("branch.view")],
            [code("branch.view"), code("branch.update"), code("branch.view")],
        );

        assert_eq!(permissions.len(), 3);
        assert_eq!(
            permissions.iter().map(PermissionCode::as_str).collect::<Vec<_>>(),
            vec!["branch.delete", "branch.update", "branch.view"]
        );
    }

    #[test]
    fn all_and_any_modes_follow_membership() {
        let all = PermissionRequirement::all([code("a.x"), code("b.x")]);
        let any = PermissionRequirement::any([code("a.x"), code("b.x")]);

        let only_a = held(&["a.x"]);
        assert!(!all.is_satisfied_by(&only_a));
        assert!(any.is_satisfied_by(&only_a));

        let both = held(&["a.x", "b.x"]);
        assert!(all.is_satisfied_by(&both));
        assert!(any.is_satisfied_by(&both));

        let neither = held(&["c.x"]);
        assert!(!all.is_satisfied_by(&neither));
        assert!(!any.is_satisfied_by(&neither));
    }

    #[test]
    fn empty_requirement_allows_users_without_permissions() {
        let empty = EffectivePermissions::default();
        assert!(PermissionRequirement::authenticated().is_satisfied_by(&empty));
        assert!(PermissionRequirement::any([]).is_satisfied_by(&empty));
        assert!(!PermissionRequirement::single(code("user.create")).is_satisfied_by(&empty));
    }

    #[test]
    fn describe_names_only_required_codes() {
        let requirement = PermissionRequirement::any([code("report.view_all"), code("report.view_self")]);
        assert_eq!(
            requirement.describe(),
            "any of permissions [report.view_all, report.view_self]"
        );
        assert_eq!(
            PermissionRequirement::single(code("customer.delete")).describe(),
            "permission 'customer.delete'"
        );
    }

    proptest! {
        #[test]
        fn union_equals_membership_in_either_source(
            direct in proptest::collection::vec("[a-c]\\.[x-z]", 0..6),
            via_groups in proptest::collection::vec("[a-c]\\.[x-z]", 0..6),
            candidate in "[a-c]\\.[x-z]",
        ) {
            let permissions = EffectivePermissions::from_sources(
                direct.iter().map(|value| code(value)),
                via_groups.iter().map(|value| code(value)),
            );
            let expected = direct.contains(&candidate) || via_groups.contains(&candidate);
            prop_assert_eq!(permissions.contains(&code(&candidate)), expected);

            let mut distinct = direct.clone();
            distinct.extend(via_groups.iter().cloned());
            distinct.sort();
            distinct.dedup();
            prop_assert_eq!(permissions.len(), distinct.len());
        }
    }
}

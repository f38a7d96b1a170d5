use serde::{Deserialize, Serialize};

use crate::{TenantId, UserId};

/// Verified principal handed over by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    user_id: UserId,
    display_name: String,
    tenant_id: TenantId,
}

impl AuthenticatedUser {
    /// Creates a principal from authentication and tenancy data.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>, tenant_id: TenantId) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            tenant_id,
        }
    }

    /// Returns the verified user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the company the user belongs to.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

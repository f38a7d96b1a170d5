use async_trait::async_trait;
use salesdesk_core::{AppResult, TenantId, UserId};
use salesdesk_domain::{AuditAction, AuditResource};

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Tenant scope for the event.
    pub tenant_id: TenantId,
    /// User that performed the action.
    pub actor_user_id: UserId,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Kind of record the event refers to.
    pub resource_type: AuditResource,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

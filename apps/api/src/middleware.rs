use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use salesdesk_application::AuthorizationService;
use salesdesk_core::{AppError, AuthenticatedUser, UserId};
use salesdesk_domain::PermissionRequirement;

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the verified user forwarded by the upstream authentication proxy.
///
/// Missing, malformed, and unknown identities are all `401`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user_id = request
        .headers()
        .get(&state.auth_user_header)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .and_then(|value| UserId::new(value).ok())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let user = state
        .user_directory
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Route-level requirement checked before the handler runs.
#[derive(Clone)]
pub struct PermissionGuard {
    authorization_service: AuthorizationService,
    requirement: Arc<PermissionRequirement>,
}

impl PermissionGuard {
    pub fn new(state: &AppState, requirement: PermissionRequirement) -> Self {
        Self {
            authorization_service: state.authorization_service.clone(),
            requirement: Arc::new(requirement),
        }
    }
}

/// Rejects the request unless the authenticated user satisfies the guard.
///
/// Must run after `require_auth`.
pub async fn require_permissions(
    State(guard): State<PermissionGuard>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    guard
        .authorization_service
        .require(&user, &guard.requirement)
        .await?;

    Ok(next.run(request).await)
}

use std::sync::Arc;

use axum::http::HeaderName;
use salesdesk_application::{
    AuditRepository, AuthorizationRepository, AuthorizationService, PermissionAdminRepository,
    PermissionAdminService, UserDirectory,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub permission_admin_service: PermissionAdminService,
    pub user_directory: Arc<dyn UserDirectory>,
    pub auth_user_header: HeaderName,
}

impl AppState {
    /// Wires services over one set of port implementations.
    pub fn new(
        authorization_repository: Arc<dyn AuthorizationRepository>,
        admin_repository: Arc<dyn PermissionAdminRepository>,
        user_directory: Arc<dyn UserDirectory>,
        audit_repository: Arc<dyn AuditRepository>,
        auth_user_header: HeaderName,
    ) -> Self {
        let authorization_service = AuthorizationService::new(authorization_repository);
        let permission_admin_service = PermissionAdminService::new(
            authorization_service.clone(),
            admin_repository,
            user_directory.clone(),
            audit_repository,
        );

        Self {
            authorization_service,
            permission_admin_service,
            user_directory,
            auth_user_header,
        }
    }
}

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use salesdesk_core::AppError;
use salesdesk_domain::{AdminPermission, PermissionRequirement};
use tower_http::trace::TraceLayer;

use crate::middleware::{self, PermissionGuard};
use crate::handlers;
use crate::state::AppState;

mod cors;


pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let self_service_routes = Router::new()
        .route(
            "/api/me/permissions",
            get(handlers::access::my_permissions_handler),
        )
        .route(
            "/api/me/permissions/check",
            post(handlers::access::check_my_permissions_handler),
        );

    let group_routes = Router::new()
        .route(
            "/api/groups",
            get(handlers::groups::list_groups_handler)
                .post(handlers::groups::create_group_handler),
        )
        .route(
            "/api/groups/{group_id}",
            get(handlers::groups::get_group_handler)
                .delete(handlers::groups::delete_group_handler),
        )
        .route(
            "/api/groups/{group_id}/permissions",
            post(handlers::groups::attach_group_permissions_handler),
        )
        .route(
            "/api/groups/{group_id}/permissions/{code}",
            put(handlers::groups::attach_group_permission_handler)
                .delete(handlers::groups::detach_group_permission_handler),
        )
        .route(
            "/api/groups/{group_id}/members/{user_id}",
            put(handlers::groups::add_group_member_handler)
                .delete(handlers::groups::remove_group_member_handler),
        )
        .route_layer(from_fn_with_state(
            PermissionGuard::new(&app_state, any_of(&GROUP_ADMINISTRATION)),
            middleware::require_permissions,
        ));

    let grant_routes = Router::new()
        .route(
            "/api/permissions",
            get(handlers::access::list_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions",
            get(handlers::users::user_access_handler)
                .post(handlers::users::grant_user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions/{code}",
            put(handlers::users::grant_user_permission_handler)
                .delete(handlers::users::revoke_user_permission_handler),
        )
        .route_layer(from_fn_with_state(
            PermissionGuard::new(&app_state, any_of(&GRANT_ADMINISTRATION)),
            middleware::require_permissions,
        ));

    let protected_routes = Router::new()
        .merge(self_service_routes)
        .merge(group_routes)
        .merge(grant_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let cors = cors::build_cors_layer(frontend_url, app_state.auth_user_header.clone())?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}

/// Any of these admits a caller to the group administration routes; each
/// operation then checks its own permission.
const GROUP_ADMINISTRATION: [AdminPermission; 6] = [
    AdminPermission::GroupView,
    AdminPermission::GroupCreate,
    AdminPermission::GroupUpdate,
    AdminPermission::GroupDelete,
    AdminPermission::UserAssignmentCreate,
    AdminPermission::UserAssignmentDelete,
];

const GRANT_ADMINISTRATION: [AdminPermission; 3] = [
    AdminPermission::PermissionView,
    AdminPermission::PermissionGrant,
    AdminPermission::PermissionRevoke,
];

fn any_of(permissions: &[AdminPermission]) -> PermissionRequirement {
    PermissionRequirement::any(permissions.iter().map(AdminPermission::code))
}

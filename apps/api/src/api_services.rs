use std::sync::Arc;

use salesdesk_application::PermissionAdminRepository;
use salesdesk_core::{AppError, AuthenticatedUser, TenantId, UserId};
use salesdesk_domain::GroupCode;
use salesdesk_infrastructure::{
    InMemoryPermissionStore, PostgresAuditRepository, PostgresAuthorizationRepository,
    PostgresPermissionAdminRepository, PostgresUserDirectory, sync_permission_catalog,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, StorageBackend};
use crate::state::AppState;

/// Connects to the configured backend and wires the application services.
pub async fn build_state(config: &ApiConfig) -> Result<AppState, AppError> {
    match &config.storage_backend {
        StorageBackend::Postgres { database_url } => {
            let pool = connect_postgres(database_url, config.database_max_connections).await?;
            run_migrations(&pool).await?;

            if config.seed_permission_catalog {
                let summary = sync_permission_catalog(&pool).await?;
                info!(
                    permissions = summary.permissions,
                    retired_permissions = summary.retired_permissions,
                    system_groups = summary.system_groups,
                    "permission catalog seeded"
                );
            }

            Ok(postgres_state(pool, config))
        }
        StorageBackend::Memory => {
            let store = Arc::new(InMemoryPermissionStore::new());
            seed_memory_store(&store).await?;
            warn!(
                "using in-memory permission store; assignments are lost on restart and user 1 \
                 of company 1 is a seeded administrator"
            );

            Ok(AppState::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store,
                config.auth_user_header.clone(),
            ))
        }
    }
}

pub async fn connect_postgres(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))
}

fn postgres_state(pool: PgPool, config: &ApiConfig) -> AppState {
    AppState::new(
        Arc::new(PostgresAuthorizationRepository::new(pool.clone())),
        Arc::new(PostgresPermissionAdminRepository::new(pool.clone())),
        Arc::new(PostgresUserDirectory::new(pool.clone())),
        Arc::new(PostgresAuditRepository::new(pool)),
        config.auth_user_header.clone(),
    )
}

/// Seeds the catalog and a company administrator so the memory backend is
/// usable without a user directory.
pub async fn seed_memory_store(store: &InMemoryPermissionStore) -> Result<AuthenticatedUser, AppError> {
    store.sync_catalog().await?;

    let administrator = AuthenticatedUser::new(
        UserId::new(1)?,
        "Demo Administrator",
        TenantId::new(1)?,
    );
    store.insert_user(administrator.clone()).await;

    let admin_group = GroupCode::new("admin")?;
    let group_id = store
        .find_group_id(&admin_group)
        .await
        .ok_or_else(|| AppError::Internal("admin system group was not seeded".to_owned()))?;
    store
        .add_group_member(group_id, administrator.user_id(), administrator.user_id())
        .await?;

    Ok(administrator)
}

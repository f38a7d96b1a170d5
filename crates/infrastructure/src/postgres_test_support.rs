use salesdesk_core::{AuthenticatedUser, TenantId, UserId};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::OnceCell;

use crate::sync_permission_catalog;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
static CATALOG_SEEDED: OnceCell<()> = OnceCell::const_new();

/// Connects to `DATABASE_URL`, migrates, and seeds the catalog once.
///
/// Returns `None` when the variable is unset so the calling test is skipped.
pub(crate) async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres permission tests: {error}");
    }

    CATALOG_SEEDED
        .get_or_init(|| async {
            if let Err(error) = sync_permission_catalog(&pool).await {
                panic!("failed to seed permission catalog in test: {error}");
            }
        })
        .await;

    Some(pool)
}

pub(crate) async fn insert_company(pool: &PgPool, name: &str) -> TenantId {
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO companies (name)
        VALUES ($1)
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await;

    match inserted.map(TenantId::new) {
        Ok(Ok(tenant_id)) => tenant_id,
        other => panic!("failed to insert test company: {other:?}"),
    }
}

pub(crate) async fn insert_user(pool: &PgPool, tenant_id: TenantId, name: &str) -> AuthenticatedUser {
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (company_id, name, email)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(tenant_id.as_i64())
    .bind(name)
    .bind(format!("{}@salesdesk.test", uuid::Uuid::new_v4()))
    .fetch_one(pool)
    .await;

    match inserted.map(UserId::new) {
        Ok(Ok(user_id)) => AuthenticatedUser::new(user_id, name, tenant_id),
        other => panic!("failed to insert test user: {other:?}"),
    }
}

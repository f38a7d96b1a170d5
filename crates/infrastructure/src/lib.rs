//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_store;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_permission_admin_repository;
mod postgres_permission_catalog;
mod postgres_rows;
mod postgres_user_directory;

#[cfg(test)]
mod postgres_test_support;

pub use in_memory_permission_store::InMemoryPermissionStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_permission_admin_repository::PostgresPermissionAdminRepository;
pub use postgres_permission_catalog::{CatalogSyncSummary, sync_permission_catalog};
pub use postgres_user_directory::PostgresUserDirectory;

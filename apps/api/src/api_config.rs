use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderName;
use salesdesk_core::AppError;
use tracing_subscriber::EnvFilter;

/// Header carrying the verified user id when none is configured.
pub const DEFAULT_AUTH_USER_HEADER: &str = "x-authenticated-user-id";

/// Assignment store backing the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub storage_backend: StorageBackend,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub auth_user_header: HeaderName,
    pub seed_permission_catalog: bool,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let storage_backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_owned())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StorageBackend::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        if migrate_only && storage_backend == StorageBackend::Memory {
            return Err(AppError::Validation(
                "the migrate command requires STORAGE_BACKEND=postgres".to_owned(),
            ));
        }

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value.parse::<u32>().map_err(|error| {
                AppError::Validation(format!("invalid DATABASE_MAX_CONNECTIONS: {error}"))
            })?,
            Err(_) => 10,
        };

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let auth_user_header = env::var("AUTH_USER_HEADER")
            .unwrap_or_else(|_| DEFAULT_AUTH_USER_HEADER.to_owned());
        let auth_user_header = HeaderName::from_str(auth_user_header.trim()).map_err(|error| {
            AppError::Validation(format!("invalid AUTH_USER_HEADER: {error}"))
        })?;

        let seed_permission_catalog = env::var("SEED_PERMISSION_CATALOG")
            .map(|value| !value.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Self {
            migrate_only,
            storage_backend,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            auth_user_header,
            seed_permission_catalog,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

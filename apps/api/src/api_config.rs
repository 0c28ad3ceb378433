use std::collections::BTreeSet;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use vendorhub_core::AppError;

const MIN_GATEWAY_SECRET_LENGTH: usize = 32;

/// Adapter family backing every repository and the policy store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub gateway_secret: String,
    pub bootstrap_super_admin_subjects: BTreeSet<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let storage_backend = env::var("STORAGE_BACKEND")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| StorageBackend::from_str(value.as_str()))
            .transpose()?
            .unwrap_or(StorageBackend::Postgres);

        let database_url = match storage_backend {
            StorageBackend::Postgres => Some(required_non_empty_env("DATABASE_URL")?),
            StorageBackend::Memory => env::var("DATABASE_URL").ok(),
        };
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to apply migrations".to_owned(),
            ));
        }

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = match env::var("API_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            Err(_) => 3001,
        };

        let gateway_secret = required_non_empty_env("GATEWAY_SHARED_SECRET")?;
        if gateway_secret.len() < MIN_GATEWAY_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "GATEWAY_SHARED_SECRET must be at least {MIN_GATEWAY_SECRET_LENGTH} characters"
            )));
        }

        let bootstrap_super_admin_subjects = parse_subject_list(
            env::var("BOOTSTRAP_SUPER_ADMIN_SUBJECTS")
                .unwrap_or_default()
                .as_str(),
        );

        Ok(Self {
            migrate_only,
            storage_backend,
            database_url,
            frontend_url,
            api_host,
            api_port,
            gateway_secret,
            bootstrap_super_admin_subjects,
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

fn parse_subject_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .map(str::to_owned)
        .collect()
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

//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::error::AppError;
use crate::store::{BackendKind, BootstrapPolicy};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Storage ===
    /// Backend selection: `memory` or `postgres`.
    #[serde(default)]
    pub storage_backend: BackendKind,

    /// Reported service version. Defaults depend on the backend.
    #[serde(default)]
    pub app_version: Option<String>,

    // === Database Connection ===
    /// Database host.
    #[serde(default = "default_db_host")]
    pub db_host: String,

    /// Database port.
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Database name.
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Database user.
    #[serde(default = "default_db_user")]
    pub db_user: String,

    /// Database password.
    #[serde(default = "default_db_password")]
    pub db_password: String,

    /// Maximum pooled connections.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Seconds to wait for a pooled connection before failing the request.
    #[serde(default = "default_db_acquire_timeout")]
    pub db_acquire_timeout_secs: u64,

    /// Abort startup if schema bootstrap fails.
    #[serde(default)]
    pub schema_init_strict: bool,

    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_db_host() -> String {
    "postgresql".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "appdb".to_string()
}

fn default_db_user() -> String {
    "appuser".to_string()
}

fn default_db_password() -> String {
    "apppassword".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_db_acquire_timeout() -> u64 {
    3
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: BackendKind::default(),
            app_version: None,
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_name: default_db_name(),
            db_user: default_db_user(),
            db_password: default_db_password(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout(),
            schema_init_strict: false,
            port: default_port(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from `(NAME, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: &str| Err(AppError::InvalidConfig(msg.to_string()));

        if self.port == 0 {
            return invalid("PORT must be non-zero");
        }

        if self.storage_backend == BackendKind::Postgres {
            if self.db_host.is_empty() {
                return invalid("DB_HOST is required for the postgres backend");
            }

            if self.db_name.is_empty() {
                return invalid("DB_NAME is required for the postgres backend");
            }

            if self.db_max_connections == 0 {
                return invalid("DB_MAX_CONNECTIONS must be at least 1");
            }
        }

        Ok(())
    }

    /// Version string reported by `GET /`.
    pub fn app_version(&self) -> String {
        match &self.app_version {
            Some(v) => v.clone(),
            None => match self.storage_backend {
                BackendKind::Memory => "v1.0".to_string(),
                BackendKind::Postgres => "v2.0-db".to_string(),
            },
        }
    }

    /// Database target as `host:port/name`.
    pub fn database_target(&self) -> String {
        format!("{}:{}/{}", self.db_host, self.db_port, self.db_name)
    }

    /// Failure policy for schema bootstrap.
    pub fn bootstrap_policy(&self) -> BootstrapPolicy {
        BootstrapPolicy::from_strict(self.schema_init_strict)
    }
}

//! Configuration management
//!
//! Settings are bound from environment variables through a fixed table of
//! config path to variable name. The process environment may first be seeded
//! from a stage-specific env file (see [`crate::env_file`]).

use std::path::{Path, PathBuf};

use config::Config;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::constants::DEFAULT_DB_PROVIDER;
use crate::env_file::{load_env_file, Stage};
use crate::error::ConfigError;

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub server: ServerSettings,
    #[validate(nested)]
    pub app: AppSettings,
    #[validate(nested)]
    pub db: DatabaseSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ServerSettings {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(length(min = 1))]
    pub base_path: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct AppSettings {
    #[validate(length(min = 1))]
    pub service_name: String,
    #[validate(length(min = 1))]
    pub postfix: String,
    pub logger_debug_mode: bool,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct DatabaseSettings {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    #[validate(length(min = 1))]
    pub user: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    /// 0 lets the provisioner pick its default.
    #[serde(default)]
    pub pool_size: u32,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub ssl_mode: bool,
}

fn default_provider() -> String {
    DEFAULT_DB_PROVIDER.to_string()
}

/// Config path to environment variable name.
///
/// Lookups fall back to the dotted path itself, so `db.host=...` in an env
/// file binds as well as `DB_HOST=...`.
pub const ENV_BINDINGS: &[(&str, &str)] = &[
    ("server.port", "SERVER_PORT"),
    ("server.host", "SERVER_HOST"),
    ("server.base_path", "SERVER_BASE_PATH"),
    ("app.service_name", "APP_SERVICE_NAME"),
    ("app.postfix", "APP_POSTFIX"),
    ("app.logger_debug_mode", "APP_LOGGER_DEBUG_MODE"),
    ("db.host", "DB_HOST"),
    ("db.port", "DB_PORT"),
    ("db.user", "DB_USER"),
    ("db.password", "DB_PASSWORD"),
    ("db.name", "DB_NAME"),
    ("db.pool_size", "DB_POOL_SIZE"),
    ("db.provider", "DB_PROVIDER"),
    ("db.ssl_mode", "DB_SSL_MODE"),
];

/// Paths with serde defaults. An empty value for these counts as unset.
pub const OPTIONAL_PATHS: &[&str] = &["db.pool_size", "db.provider", "db.ssl_mode"];

impl Settings {
    /// Seeds the environment from the stage file (if any) under the current
    /// directory, then binds the settings.
    pub fn load() -> Result<Self, ConfigError> {
        let root = std::env::current_dir().map_err(|source| ConfigError::EnvFile {
            path: PathBuf::from("."),
            source,
        })?;
        Self::load_from(&root)
    }

    pub fn load_from(root: &Path) -> Result<Self, ConfigError> {
        if let Some(stage) = Stage::from_env() {
            let path = stage.env_file(root);
            info!(?stage, path = %path.display(), "Seeding environment from file");
            load_env_file(&path)?;
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Binds every entry of [`ENV_BINDINGS`] through `lookup`, converts the
    /// values to their field types and validates required fields.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();
        for (path, key) in ENV_BINDINGS {
            let Some(value) = lookup(key).or_else(|| lookup(path)) else {
                continue;
            };
            if value.is_empty() && OPTIONAL_PATHS.contains(path) {
                continue;
            }
            builder = builder.set_override(*path, value)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Loads the process configuration. Call once at startup and pass the result
/// to whoever needs it.
pub fn load_environment() -> Result<Settings, ConfigError> {
    Settings::load()
}

//! Connection parameters and connection strings

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use users_shared::DatabaseSettings;

use crate::error::DbError;

pub const DEFAULT_POOL_SIZE: u32 = 10;
pub const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProvider {
    Postgres,
    Sqlite,
}

impl DbProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbProvider::Postgres => "postgres",
            DbProvider::Sqlite => "sqlite3",
        }
    }
}

impl fmt::Display for DbProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DbProvider {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" | "postgresql" => Ok(DbProvider::Postgres),
            "sqlite" | "sqlite3" => Ok(DbProvider::Sqlite),
            other => Err(DbError::UnsupportedProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub provider: DbProvider,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub db_name: String,
    pub ssl_mode: bool,
    /// 0 means [`DEFAULT_POOL_SIZE`].
    pub pool_size: u32,
    /// Zero means [`DEFAULT_MAX_IDLE_TIME`].
    pub max_idle_time: Duration,
}

impl ConnectionParams {
    /// Maps the `db` section of the settings. Fails on an unknown provider.
    pub fn from_settings(db: &DatabaseSettings) -> Result<Self, DbError> {
        Ok(Self {
            provider: db.provider.parse()?,
            user: db.user.clone(),
            password: db.password.clone(),
            host: db.host.clone(),
            port: db.port,
            db_name: db.name.clone(),
            ssl_mode: db.ssl_mode,
            pool_size: db.pool_size,
            max_idle_time: Duration::ZERO,
        })
    }

    pub fn apply_defaults(&mut self) {
        if self.pool_size == 0 {
            self.pool_size = DEFAULT_POOL_SIZE;
        }

        if self.max_idle_time.is_zero() {
            self.max_idle_time = DEFAULT_MAX_IDLE_TIME;
        }
    }
}

pub fn ssl_mode_value(enabled: bool) -> &'static str {
    if enabled {
        "enable"
    } else {
        "disable"
    }
}

/// Driver connection string for `params.provider`.
///
/// SQLite ignores credentials, host and port: it is a shared in-memory
/// database named after `db_name`.
pub fn build_url_connection(params: &ConnectionParams) -> String {
    match params.provider {
        DbProvider::Postgres => format!(
            "user={} password={} host={} port={} dbname={} sslmode={}",
            params.user,
            params.password,
            params.host,
            params.port,
            params.db_name,
            ssl_mode_value(params.ssl_mode),
        ),
        DbProvider::Sqlite => format!("sqlite:{}?mode=memory&cache=shared", params.db_name),
    }
}

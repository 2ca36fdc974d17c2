//! Driver selection
//!
//! Turns a connection string into the options of the matching sqlx driver.

use std::str::FromStr;

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::ConnectOptions;

use super::connection::DbProvider;
use crate::error::DbError;

#[derive(Debug, Clone)]
pub enum Dialect {
    Postgres(PgConnectOptions),
    Sqlite(SqliteConnectOptions),
}

impl Dialect {
    pub fn provider(&self) -> DbProvider {
        match self {
            Dialect::Postgres(_) => DbProvider::Postgres,
            Dialect::Sqlite(_) => DbProvider::Sqlite,
        }
    }

    /// Statements are logged at `info` when enabled, not at all otherwise.
    pub fn with_statement_logging(self, enabled: bool) -> Self {
        match self {
            Dialect::Postgres(options) => Dialect::Postgres(statement_logging(options, enabled)),
            Dialect::Sqlite(options) => Dialect::Sqlite(statement_logging(options, enabled)),
        }
    }
}

fn statement_logging<O: ConnectOptions>(options: O, enabled: bool) -> O {
    if enabled {
        options.log_statements(LevelFilter::Info)
    } else {
        options.disable_statement_logging()
    }
}

pub fn select_dialect(provider: DbProvider, url: &str) -> Result<Dialect, DbError> {
    let dialect = match provider {
        DbProvider::Postgres => parse_postgres(url).map(Dialect::Postgres),
        DbProvider::Sqlite => SqliteConnectOptions::from_str(url)
            .map(Dialect::Sqlite)
            .map_err(|e| e.to_string()),
    };

    dialect.map_err(|message| DbError::Dialect { provider, message })
}

/// Parses the `key=value` form produced for postgres.
fn parse_postgres(url: &str) -> Result<PgConnectOptions, String> {
    let mut options = PgConnectOptions::new_without_pgpass();

    for segment in url.split_whitespace() {
        let (key, value) = segment
            .split_once('=')
            .ok_or_else(|| format!("malformed segment {segment:?}"))?;

        options = match key {
            "user" => options.username(value),
            "password" => options.password(value),
            "host" => options.host(value),
            "port" => options.port(
                value
                    .parse()
                    .map_err(|_| format!("invalid port {value:?}"))?,
            ),
            "dbname" => options.database(value),
            "sslmode" => options.ssl_mode(ssl_mode(value)?),
            other => return Err(format!("unknown key {other:?}")),
        };
    }

    Ok(options)
}

fn ssl_mode(value: &str) -> Result<PgSslMode, String> {
    match value {
        "enable" => Ok(PgSslMode::Require),
        "disable" => Ok(PgSslMode::Disable),
        other => PgSslMode::from_str(other).map_err(|e| e.to_string()),
    }
}

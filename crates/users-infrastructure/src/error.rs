//! Database provisioning errors

use std::time::Duration;
use thiserror::Error;

use crate::database::DbProvider;

/// How the fail-fast entrypoint reacts to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log and exit the process.
    Fatal,
    /// Log and panic, so a backtrace can be captured.
    Abort,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("db provider unsupported: {0:?}")]
    UnsupportedProvider(String),

    #[error("error creating dialector for {provider} database: {message}")]
    Dialect { provider: DbProvider, message: String },

    #[error("error on {provider} connection to {host}: {source}")]
    Open {
        provider: DbProvider,
        host: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("error acquiring {provider} pool handle for {host}: {source}")]
    PoolHandle {
        provider: DbProvider,
        host: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("error pinging {provider} at {host}: {source}")]
    Ping {
        provider: DbProvider,
        host: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("ping to {provider} at {host} timed out after {timeout:?}")]
    PingTimeout {
        provider: DbProvider,
        host: String,
        timeout: Duration,
    },
}

impl DbError {
    pub fn severity(&self) -> Severity {
        match self {
            DbError::UnsupportedProvider(_) | DbError::Dialect { .. } | DbError::Open { .. } => {
                Severity::Fatal
            }
            DbError::PoolHandle { .. } | DbError::Ping { .. } | DbError::PingTimeout { .. } => {
                Severity::Abort
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_tiers() {
        assert_eq!(
            DbError::UnsupportedProvider("mysql".into()).severity(),
            Severity::Fatal
        );
        assert_eq!(
            DbError::Open {
                provider: DbProvider::Postgres,
                host: "localhost".into(),
                source: sqlx::Error::PoolTimedOut,
            }
            .severity(),
            Severity::Fatal
        );
        assert_eq!(
            DbError::Ping {
                provider: DbProvider::Postgres,
                host: "localhost".into(),
                source: sqlx::Error::PoolClosed,
            }
            .severity(),
            Severity::Abort
        );
    }

    #[test]
    fn test_messages_carry_provider_and_host() {
        let err = DbError::PoolHandle {
            provider: DbProvider::Postgres,
            host: "db.internal".into(),
            source: sqlx::Error::PoolTimedOut,
        };
        let message = err.to_string();
        assert!(message.contains("postgres"));
        assert!(message.contains("db.internal"));

        let err = DbError::UnsupportedProvider("mysql".into());
        assert!(err.to_string().starts_with("db provider unsupported"));
    }
}

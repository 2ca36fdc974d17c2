//! Pool setup and the shared database handle

use std::time::Duration;

use sqlx::pool::Pool;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Connection;
use tracing::{debug, info};

use super::connection::{build_url_connection, ConnectionParams, DbProvider};
use super::dialect::{select_dialect, Dialect};
use super::naming::NamingStrategy;
use crate::error::DbError;

/// Options applied on top of the connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub log_query: bool,
    pub singular_table: bool,
    /// Bound on the liveness check. `None` waits on the driver.
    pub ping_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    pub fn as_postgres(&self) -> Option<&PgPool> {
        match self {
            DbPool::Postgres(pool) => Some(pool),
            DbPool::Sqlite(_) => None,
        }
    }

    pub fn as_sqlite(&self) -> Option<&SqlitePool> {
        match self {
            DbPool::Sqlite(pool) => Some(pool),
            DbPool::Postgres(_) => None,
        }
    }

    pub fn max_connections(&self) -> u32 {
        match self {
            DbPool::Postgres(pool) => pool.options().get_max_connections(),
            DbPool::Sqlite(pool) => pool.options().get_max_connections(),
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self {
            DbPool::Postgres(pool) => pool.options().get_idle_timeout(),
            DbPool::Sqlite(pool) => pool.options().get_idle_timeout(),
        }
    }

    pub async fn close(&self) {
        match self {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::Sqlite(pool) => pool.close().await,
        }
    }
}

/// The process-wide database handle.
#[derive(Debug)]
pub struct Database {
    pool: DbPool,
    provider: DbProvider,
    naming: NamingStrategy,
}

impl Database {
    pub fn new(pool: DbPool, provider: DbProvider, naming: NamingStrategy) -> Self {
        Self {
            pool,
            provider,
            naming,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn provider(&self) -> DbProvider {
        self.provider
    }

    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    pub fn table_name(&self, entity: &str) -> String {
        self.naming.table_name(entity)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Runs the full setup: defaults, connection string, dialect, pool, ping.
pub async fn connect(
    mut params: ConnectionParams,
    options: &ConnectionOptions,
) -> Result<Database, DbError> {
    params.apply_defaults();

    let url = build_url_connection(&params);
    let dialect = select_dialect(params.provider, &url)?;
    info!(provider = %params.provider, "Using {} dialect", dialect.provider());

    if options.log_query {
        info!("Enabling query log");
    }
    let dialect = dialect.with_statement_logging(options.log_query);

    let naming = if options.singular_table {
        info!("Enabling singular tables");
        NamingStrategy::singular()
    } else {
        NamingStrategy::default()
    };

    let pool = open_pool(dialect, &params)
        .await
        .map_err(|source| DbError::Open {
            provider: params.provider,
            host: params.host.clone(),
            source,
        })?;
    debug!(
        max_connections = params.pool_size,
        max_idle = ?params.max_idle_time,
        "Pool configured"
    );

    verify(&pool, &params, options.ping_timeout).await?;

    info!(
        provider = %params.provider,
        host = %params.host,
        "{} successfully connected {}",
        params.provider,
        params.host
    );

    Ok(Database::new(pool, params.provider, naming))
}

async fn open_pool(dialect: Dialect, params: &ConnectionParams) -> Result<DbPool, sqlx::Error> {
    match dialect {
        Dialect::Postgres(options) => PgPoolOptions::new()
            .max_connections(params.pool_size)
            .idle_timeout(params.max_idle_time)
            .connect_with(options)
            .await
            .map(DbPool::Postgres),
        Dialect::Sqlite(options) => SqlitePoolOptions::new()
            .max_connections(params.pool_size)
            .idle_timeout(params.max_idle_time)
            .connect_with(options)
            .await
            .map(DbPool::Sqlite),
    }
}

enum Liveness {
    PoolHandle(sqlx::Error),
    Ping(sqlx::Error),
}

async fn acquire_and_ping<DB: sqlx::Database>(pool: &Pool<DB>) -> Result<(), Liveness> {
    let mut conn = pool.acquire().await.map_err(Liveness::PoolHandle)?;
    conn.ping().await.map_err(Liveness::Ping)
}

async fn verify(
    pool: &DbPool,
    params: &ConnectionParams,
    timeout: Option<Duration>,
) -> Result<(), DbError> {
    let check = async {
        match pool {
            DbPool::Postgres(pool) => acquire_and_ping(pool).await,
            DbPool::Sqlite(pool) => acquire_and_ping(pool).await,
        }
    };

    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, check)
            .await
            .map_err(|_| DbError::PingTimeout {
                provider: params.provider,
                host: params.host.clone(),
                timeout: limit,
            })?,
        None => check.await,
    };

    result.map_err(|failure| liveness_error(failure, params))
}

fn liveness_error(failure: Liveness, params: &ConnectionParams) -> DbError {
    match failure {
        Liveness::PoolHandle(source) => DbError::PoolHandle {
            provider: params.provider,
            host: params.host.clone(),
            source,
        },
        Liveness::Ping(source) => DbError::Ping {
            provider: params.provider,
            host: params.host.clone(),
            source,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use sqlx::postgres::PgConnectOptions;

    fn sqlite_params(db_name: &str) -> ConnectionParams {
        ConnectionParams {
            provider: DbProvider::Sqlite,
            user: String::new(),
            password: String::new(),
            host: "memory".into(),
            port: 0,
            db_name: db_name.into(),
            ssl_mode: false,
            pool_size: 0,
            max_idle_time: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_connect_sqlite_applies_defaults() {
        let db = connect(sqlite_params("pool_defaults"), &ConnectionOptions::default())
            .await
            .unwrap();

        assert_eq!(db.provider(), DbProvider::Sqlite);
        assert_eq!(db.pool().max_connections(), 10);
        assert_eq!(db.pool().idle_timeout(), Some(Duration::from_secs(60)));
        assert!(db.pool().as_sqlite().is_some());
        assert!(db.pool().as_postgres().is_none());
        assert_eq!(db.table_name("User"), "users");

        db.close().await;
    }

    #[tokio::test]
    async fn test_connect_sqlite_with_options() {
        let params = ConnectionParams {
            pool_size: 2,
            max_idle_time: Duration::from_secs(5),
            ..sqlite_params("pool_options")
        };
        let options = ConnectionOptions {
            log_query: true,
            singular_table: true,
            ping_timeout: Some(Duration::from_secs(5)),
        };

        let db = connect(params, &options).await.unwrap();

        assert_eq!(db.pool().max_connections(), 2);
        assert_eq!(db.pool().idle_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(db.table_name("User"), "user");
        assert!(db.naming().singular_table);

        db.close().await;
    }

    #[tokio::test]
    async fn test_connect_postgres_bad_dsn_is_dialect_error() {
        let params = ConnectionParams {
            provider: DbProvider::Postgres,
            user: "u".into(),
            password: "p".into(),
            host: "localhost".into(),
            port: 5432,
            db_name: "has space".into(),
            ssl_mode: false,
            pool_size: 0,
            max_idle_time: Duration::ZERO,
        };

        let err = connect(params, &ConnectionOptions::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Dialect { .. }));
    }

    fn postgres_params(host: &str, port: u16) -> ConnectionParams {
        ConnectionParams {
            provider: DbProvider::Postgres,
            user: "u".into(),
            password: "p".into(),
            host: host.into(),
            port,
            db_name: "mydb".into(),
            ssl_mode: false,
            pool_size: 1,
            max_idle_time: Duration::from_secs(60),
        }
    }

    fn lazy_postgres(params: &ConnectionParams, acquire_timeout: Duration) -> DbPool {
        let options = PgConnectOptions::new_without_pgpass()
            .host(&params.host)
            .port(params.port)
            .username(&params.user)
            .password(&params.password)
            .database(&params.db_name);
        let pool = PgPoolOptions::new()
            .max_connections(params.pool_size)
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(options);
        DbPool::Postgres(pool)
    }

    #[tokio::test]
    async fn test_verify_unresponsive_server_times_out() {
        // accepts the TCP connection but never answers the startup message
        let silent = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();
        let params = postgres_params("127.0.0.1", port);
        let pool = lazy_postgres(&params, Duration::from_secs(30));
        let limit = Duration::from_millis(100);

        let err = verify(&pool, &params, Some(limit)).await.unwrap_err();

        match &err {
            DbError::PingTimeout { provider, timeout, .. } => {
                assert_eq!(*provider, DbProvider::Postgres);
                assert_eq!(*timeout, limit);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.severity(), Severity::Abort);
    }

    #[tokio::test]
    async fn test_verify_refused_connection_is_pool_handle_error() {
        let params = postgres_params("127.0.0.1", 1);
        let pool = lazy_postgres(&params, Duration::from_millis(200));

        let err = verify(&pool, &params, Some(Duration::from_secs(10)))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::PoolHandle { .. }), "got {err}");
        assert_eq!(err.severity(), Severity::Abort);
        assert!(err.to_string().contains("127.0.0.1"));
    }

    #[test]
    fn test_ping_failure_maps_to_ping_error() {
        let params = postgres_params("db.internal", 5432);

        let err = liveness_error(Liveness::Ping(sqlx::Error::PoolClosed), &params);

        match &err {
            DbError::Ping { provider, host, .. } => {
                assert_eq!(*provider, DbProvider::Postgres);
                assert_eq!(host, "db.internal");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.severity(), Severity::Abort);
    }
}

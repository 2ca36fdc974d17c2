//! One-time database provisioning
//!
//! A [`Provisioner`] is created by the entrypoint and shared (usually behind
//! an `Arc`). The first call to [`Provisioner::get_connection`] runs the
//! setup; concurrent callers wait for it, later callers get the stored handle.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::error;

use super::connection::ConnectionParams;
use super::pool::{connect, ConnectionOptions, Database};
use crate::error::{DbError, Severity};

/// Performs the actual connection setup.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        params: ConnectionParams,
        options: ConnectionOptions,
    ) -> Result<Database, DbError>;
}

/// Connects through sqlx.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxConnector;

#[async_trait]
impl Connector for SqlxConnector {
    async fn connect(
        &self,
        params: ConnectionParams,
        options: ConnectionOptions,
    ) -> Result<Database, DbError> {
        connect(params, &options).await
    }
}

pub struct Provisioner<C = SqlxConnector> {
    connector: C,
    params: ConnectionParams,
    options: ConnectionOptions,
    instance: OnceCell<Arc<Database>>,
}

impl Provisioner<SqlxConnector> {
    pub fn new(params: ConnectionParams, options: ConnectionOptions) -> Self {
        Self::with_connector(SqlxConnector, params, options)
    }
}

impl<C: Connector> Provisioner<C> {
    pub fn with_connector(connector: C, params: ConnectionParams, options: ConnectionOptions) -> Self {
        Self {
            connector,
            params,
            options,
            instance: OnceCell::new(),
        }
    }

    /// Returns the handle, creating it on first use.
    ///
    /// A failed setup leaves nothing stored, so the next call tries again.
    pub async fn try_get_connection(&self) -> Result<Arc<Database>, DbError> {
        self.instance
            .get_or_try_init(|| async {
                self.connector
                    .connect(self.params.clone(), self.options.clone())
                    .await
                    .map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Like [`Self::try_get_connection`], but a startup failure ends the
    /// process: [`Severity::Fatal`] errors exit with status 1,
    /// [`Severity::Abort`] errors panic.
    pub async fn get_connection(&self) -> Arc<Database> {
        match self.try_get_connection().await {
            Ok(database) => database,
            Err(err) => fail_fast(&self.params, err),
        }
    }

    /// The handle if setup already completed.
    pub fn get(&self) -> Option<Arc<Database>> {
        self.instance.get().cloned()
    }
}

fn fail_fast(params: &ConnectionParams, err: DbError) -> ! {
    error!(
        provider = %params.provider,
        host = %params.host,
        error = %err,
        "Database provisioning failed"
    );

    match err.severity() {
        Severity::Abort => panic!("error on {} connection: {}", params.provider, err),
        Severity::Fatal => std::process::exit(1),
    }
}

//! # Users Infrastructure
//!
//! Provisions the service's pooled database connection.

pub mod database;
pub mod error;

pub use database::{
    build_url_connection, ConnectionOptions, ConnectionParams, Database, DbPool, DbProvider,
    Provisioner,
};
pub use error::{DbError, Severity};

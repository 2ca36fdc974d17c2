//! Database module (connection provisioning)

pub mod connection;
pub mod dialect;
pub mod naming;
pub mod pool;
pub mod provisioner;

pub use connection::{build_url_connection, ConnectionParams, DbProvider};
pub use dialect::{select_dialect, Dialect};
pub use naming::NamingStrategy;
pub use pool::{connect, ConnectionOptions, Database, DbPool};
pub use provisioner::{Connector, Provisioner, SqlxConnector};

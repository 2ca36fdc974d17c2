//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error reading config file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid entry at {}:{line}: key {key:?} cannot be set", path.display())]
    InvalidEntry {
        path: PathBuf,
        line: usize,
        key: String,
    },

    #[error("error getting configurations from env: {0}")]
    Binding(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

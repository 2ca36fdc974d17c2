//! # Users Shared
//!
//! Configuration loading, error types and telemetry for the users service.

pub mod constants;
pub mod env_file;
pub mod telemetry;
pub mod config;
pub mod error;

pub use crate::config::{load_environment, AppSettings, DatabaseSettings, ServerSettings, Settings};
pub use error::ConfigError;

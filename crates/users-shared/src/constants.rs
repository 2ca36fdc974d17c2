//! Application-wide constants

/// Selects the deployment stage (`local`, `dev`, `prod`).
pub const STAGE_ENV_VAR: &str = "ENVIRONMENT";

pub const LOG_FORMAT_ENV_VAR: &str = "LOG_FORMAT";
pub const LOG_DIR_ENV_VAR: &str = "LOG_DIR";
pub const LOG_FILE_PREFIX: &str = "users";

pub const DEFAULT_DB_PROVIDER: &str = "postgres";

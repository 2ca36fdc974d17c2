//! Environment file seeding
//!
//! A stage-specific `.env.<stage>` file is read line by line and every
//! `KEY=VALUE` pair is exported into the process environment before the
//! configuration is bound.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::constants::STAGE_ENV_VAR;
use crate::error::ConfigError;

/// Deployment stage selecting which env file to seed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Local,
    Dev,
    Prod,
}

impl Stage {
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "local" => Some(Stage::Local),
            "dev" => Some(Stage::Dev),
            "prod" => Some(Stage::Prod),
            _ => None,
        }
    }

    /// Reads the stage from `ENVIRONMENT`. Unset or unknown means no file.
    pub fn from_env() -> Option<Self> {
        let value = std::env::var(STAGE_ENV_VAR).ok()?;
        let stage = Self::from_value(&value);
        if stage.is_none() {
            warn!(stage = %value, "Unknown deployment stage, no env file will be loaded");
        }
        stage
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Stage::Local => ".env.local",
            Stage::Dev => ".env.dev",
            Stage::Prod => ".env.prod",
        }
    }

    pub fn env_file(self, root: &Path) -> PathBuf {
        root.join(self.file_name())
    }
}

/// Splits on the first `=`; the value keeps any further `=` characters.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    line.split_once('=')
}

/// Exports every `KEY=VALUE` line of `path`, overwriting existing variables.
///
/// Lines without a separator are skipped. Returns how many variables were set.
pub fn load_env_file(path: &Path) -> Result<usize, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut applied = 0;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| ConfigError::EnvFile {
            path: path.to_path_buf(),
            source,
        })?;

        let Some((key, value)) = parse_line(&line) else {
            continue;
        };

        // the environment cannot hold empty keys or NUL bytes
        if key.is_empty() || key.contains('\0') || value.contains('\0') {
            return Err(ConfigError::InvalidEntry {
                path: path.to_path_buf(),
                line: index + 1,
                key: key.to_string(),
            });
        }

        std::env::set_var(key, value);
        applied += 1;
    }

    debug!(path = %path.display(), applied, "Environment file loaded");
    Ok(applied)
}

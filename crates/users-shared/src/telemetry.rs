//! Telemetry setup

use anyhow::Result;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::{LOG_DIR_ENV_VAR, LOG_FILE_PREFIX, LOG_FORMAT_ENV_VAR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(debug_mode: bool) -> &'static str {
    if debug_mode {
        "debug"
    } else {
        "info"
    }
}

/// Stderr subscriber for the startup phase, before settings are known.
///
/// Use with `tracing::subscriber::with_default` around configuration
/// loading, then install the real one with [`init_telemetry`].
pub fn bootstrap_subscriber() -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    bootstrap_subscriber_with(filter, std::io::stderr)
}

pub(crate) fn bootstrap_subscriber_with<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .finish()
}

/// Installs the global subscriber.
///
/// `LOG_FORMAT=json` switches stdout to JSON; `LOG_DIR` adds a daily rolling
/// file. Fails if a subscriber is already set or the log dir is unusable.
pub fn init_telemetry(debug_mode: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug_mode)));

    let format = LogFormat::from_value(std::env::var(LOG_FORMAT_ENV_VAR).ok().as_deref());

    let stdout_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
    };

    let file_layer = match std::env::var(LOG_DIR_ENV_VAR) {
        Ok(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .build(dir)?;
            Some(fmt::layer().with_writer(appender).with_ansi(false))
        }
        Err(_) => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

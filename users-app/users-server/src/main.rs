use std::time::Duration;

use tracing::{error, info};

use users_infrastructure::{ConnectionOptions, ConnectionParams, Provisioner};
use users_shared::{load_environment, telemetry};

mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (seeds env from .env.<stage> when ENVIRONMENT is set).
    // Settings decide the real subscriber, so loading logs to stderr.
    let loaded = tracing::subscriber::with_default(telemetry::bootstrap_subscriber(), || {
        load_environment().inspect_err(|e| error!("Failed to load configuration: {}", e))
    });
    let config = match loaded {
        Ok(c) => c,
        Err(_) => std::process::exit(1),
    };

    // Initialize telemetry
    telemetry::init_telemetry(config.app.logger_debug_mode)?;

    info!(
        service = %config.app.service_name,
        postfix = %config.app.postfix,
        "Users service starting..."
    );

    // Connect to Database
    let params = match ConnectionParams::from_settings(&config.db) {
        Ok(p) => p,
        Err(e) => {
            error!("Invalid database configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Connecting to {} database at {}:{}...", params.provider, params.host, params.port);

    let provisioner = Provisioner::new(
        params,
        ConnectionOptions {
            log_query: true,
            singular_table: true,
            ping_timeout: Some(Duration::from_secs(30)),
        },
    );
    let db = provisioner.get_connection().await;
    info!("Database connection established.");

    // Create App State
    let state = AppState::new(db, config);
    let server = &state.settings().server;
    info!(
        "Ready on {}:{}{}",
        server.host, server.port, server.base_path
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    state.db.close().await;

    Ok(())
}

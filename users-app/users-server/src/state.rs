use std::sync::Arc;

use users_infrastructure::Database;
use users_shared::Settings;

/// Startup products shared with the rest of the service.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    config: Arc<Settings>,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Settings) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.config
    }
}

//! Shared application state for request handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::services::WizardRegistry;

/// Shared application state. Cheap to clone; handlers get one per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    wizards: WizardRegistry,
}

impl AppState {
    /// Create application state from loaded configuration and a connected
    /// pool.
    #[must_use]
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                wizards: WizardRegistry::default(),
            }),
        }
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Active wizard sessions.
    #[must_use]
    pub fn wizards(&self) -> &WizardRegistry {
        &self.inner.wizards
    }
}

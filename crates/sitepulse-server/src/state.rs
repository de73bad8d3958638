use std::sync::Arc;

use sitepulse_core::{config::Config, store::EventStore};
use sitepulse_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Event log behind the trait object, so tests can swap in the in-memory
    /// store or a failing one.
    pub store: Arc<dyn EventStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct a new `AppState` wrapping the DuckDB backend and config.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        Self::with_store(Arc::new(db), config)
    }

    pub fn with_store(store: Arc<dyn EventStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

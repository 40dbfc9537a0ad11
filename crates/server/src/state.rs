//! Application state shared across handlers.

use formbox_core::config::AppConfig;
use formbox_store::FormStore;
use std::sync::Arc;

/// Shared application state.
///
/// Handlers never cache store data across invocations; the store is the
/// only shared resource and every request is served statelessly.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Persistence layer.
    pub store: Arc<dyn FormStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create a new application state.
    ///
    /// This validates configuration limits and logs warnings for unusual
    /// settings; invalid limits are a startup error.
    pub fn new(config: AppConfig, store: Arc<dyn FormStore>) -> anyhow::Result<Self> {
        match config.server.validate() {
            Ok(warnings) => {
                for warning in warnings {
                    tracing::warn!("Configuration warning: {}", warning);
                }
            }
            Err(error) => {
                anyhow::bail!("invalid server configuration: {error}");
            }
        }

        Ok(Self {
            config: Arc::new(config),
            store,
        })
    }

    /// Clamp a client-requested page size to the configured bounds.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.config.server.default_page_size)
            .clamp(1, self.config.server.max_page_size)
    }
}

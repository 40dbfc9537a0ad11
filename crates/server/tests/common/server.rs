//! Server test utilities.

use formbox_core::config::{AdminConfig, AppConfig, ServerConfig, StoreConfig};
use formbox_server::{AppState, create_router};
use formbox_store::{FormStore, SqliteStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server backed by a temporary SQLite database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let db_path = temp_dir.path().join("formbox.db");
        let store: Arc<dyn FormStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create store"),
        );

        let mut config = AppConfig {
            server: ServerConfig::default(),
            store: StoreConfig::Sqlite { path: db_path },
            admin: AdminConfig::for_testing(),
        };

        modifier(&mut config);

        let state = AppState::new(config, store).expect("Failed to create state");
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying store.
    pub fn store(&self) -> Arc<dyn FormStore> {
        self.state.store.clone()
    }
}

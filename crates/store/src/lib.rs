//! Persistence layer for Formbox.
//!
//! This crate owns the durable data model:
//! - Form definitions and their schemas
//! - Submissions against a form
//! - API keys and the bootstrap admin key
//!
//! Handlers depend only on the [`FormStore`] trait, which keeps the seam
//! open for alternative backends and lets tests run against a temporary
//! SQLite file.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{FormStore, SqliteStore};

use formbox_core::config::StoreConfig;
use std::sync::Arc;

/// Create a store from configuration.
pub async fn from_config(config: &StoreConfig) -> StoreResult<Arc<dyn FormStore>> {
    match config {
        StoreConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn FormStore>)
        }
    }
}

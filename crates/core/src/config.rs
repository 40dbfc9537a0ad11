//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Default page size for list endpoints.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Maximum page size for list endpoints.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_page_size() -> u32 {
    crate::DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    crate::MAX_PAGE_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_size: default_max_body_size(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl ServerConfig {
    /// Validate limits, returning warnings for unusual but workable settings.
    pub fn validate(&self) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err("page sizes must be greater than zero".to_string());
        }
        if self.default_page_size > self.max_page_size {
            return Err(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size, self.max_page_size
            ));
        }
        if self.max_body_size > 16 * 1024 * 1024 {
            warnings.push(format!(
                "max_body_size of {} bytes is unusually large for form payloads",
                self.max_body_size
            ));
        }
        Ok(warnings)
    }
}

/// Persistence backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// SQLite database file.
    Sqlite {
        /// Path to the database file. Parent directories are created on open.
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/formbox.db"),
        }
    }
}

/// Admin API key configuration.
///
/// The admin key provides initial access for form management. If the key
/// hash changes between restarts, the previous bootstrap key is revoked
/// and a new one is created.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Pre-computed hash of the admin API key (SHA256 hex, 64 characters,
    /// optional `sha256:` prefix).
    /// Generate with: `echo -n "your-secret-key" | sha256sum`
    pub key_hash: String,
    /// Label recorded on the bootstrap key.
    pub key_label: Option<String>,
}

impl AdminConfig {
    /// Create a test configuration with a dummy key hash.
    ///
    /// **For testing only.** The hash is deterministic but not a real key.
    pub fn for_testing() -> Self {
        Self {
            // SHA256 of "test-admin-key"
            key_hash: "944650a7cd0f9e14d5c4fb15edbffb7fa45fb9ed36a4fa9be3d7e5476ae51bd9"
                .to_string(),
            key_label: Some("Test admin key".to_string()),
        }
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Create a test configuration with defaults and a dummy admin key.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            admin: AdminConfig::for_testing(),
        }
    }
}

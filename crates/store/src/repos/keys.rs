//! API key repository.

use crate::error::StoreResult;
use crate::models::ApiKeyRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for API key operations.
#[async_trait]
pub trait ApiKeyRepo: Send + Sync {
    /// Create a new API key record.
    async fn create_api_key(&self, key: &ApiKeyRow) -> StoreResult<()>;

    /// Get an API key by ID.
    async fn get_api_key(&self, key_id: Uuid) -> StoreResult<Option<ApiKeyRow>>;

    /// Look up an API key by its SHA-256 hash.
    async fn get_api_key_by_hash(&self, key_hash: &str) -> StoreResult<Option<ApiKeyRow>>;

    /// Revoke an API key.
    async fn revoke_api_key(&self, key_id: Uuid, revoked_at: OffsetDateTime) -> StoreResult<()>;

    /// Record the last-used time for an API key.
    async fn touch_api_key(&self, key_id: Uuid, used_at: OffsetDateTime) -> StoreResult<()>;

    /// Get the bootstrap admin key ID, if one has been recorded.
    async fn get_bootstrap_key_id(&self) -> StoreResult<Option<Uuid>>;

    /// Record the bootstrap admin key ID.
    async fn set_bootstrap_key_id(&self, key_id: Uuid) -> StoreResult<()>;
}

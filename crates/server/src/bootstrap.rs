//! Admin API key initialization.

use anyhow::{Result, bail};
use formbox_core::config::AdminConfig;
use formbox_store::FormStore;
use formbox_store::models::ApiKeyRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Ensure the configured admin key exists, rotating the previous one if needed.
///
/// If the key hash changes between restarts, the previous admin key is
/// automatically revoked and a new one is created with the new hash.
pub async fn ensure_admin_key(store: &dyn FormStore, config: &AdminConfig) -> Result<()> {
    // Normalize to lowercase to match auth.rs hash_api_key() which uses
    // lowercase hex encoding. Without this, uppercase hashes in config would
    // never match during authentication.
    let hash = config
        .key_hash
        .strip_prefix("sha256:")
        .unwrap_or(&config.key_hash)
        .to_lowercase();
    let hash = hash.as_str();
    if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid admin key_hash: expected 64 hex chars");
    }

    if let Some(existing) = store.get_api_key_by_hash(hash).await? {
        // Reject if the key was previously revoked
        if existing.revoked_at.is_some() {
            bail!(
                "admin key hash matches a revoked key (id={}); \
                 use a new key hash or clear the revoked key",
                existing.key_id
            );
        }
        store.set_bootstrap_key_id(existing.key_id).await?;
        tracing::debug!("Admin key already exists");
        return Ok(());
    }

    let now = OffsetDateTime::now_utc();
    if let Some(prev_id) = store.get_bootstrap_key_id().await? {
        store.revoke_api_key(prev_id, now).await?;
        tracing::info!(key_id = %prev_id, "Previous admin key revoked");
    }

    let key = ApiKeyRow {
        key_id: Uuid::new_v4(),
        key_hash: hash.to_string(),
        label: config.key_label.clone(),
        created_at: now,
        revoked_at: None,
        last_used_at: None,
    };

    store.create_api_key(&key).await?;
    store.set_bootstrap_key_id(key.key_id).await?;
    tracing::info!(key_id = %key.key_id, "Admin key created");

    Ok(())
}

//! Test fixtures for generating test data.

use super::server::TestServer;
use formbox_store::models::ApiKeyRow;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Compute SHA-256 hash of data as hex string.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub fn sha256_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    result.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create an API key in the store and return the raw (unhashed) key.
#[allow(dead_code)]
pub async fn create_test_key(server: &TestServer, label: &str) -> String {
    let raw_key = format!("test-key-{}", Uuid::new_v4());
    let key = ApiKeyRow {
        key_id: Uuid::new_v4(),
        key_hash: sha256_hash(raw_key.as_bytes()),
        label: Some(label.to_string()),
        created_at: OffsetDateTime::now_utc(),
        revoked_at: None,
        last_used_at: None,
    };

    server
        .store()
        .create_api_key(&key)
        .await
        .expect("Failed to create test key");

    raw_key
}

/// A minimal valid schema: one required email field.
#[allow(dead_code)]
pub fn email_schema() -> serde_json::Value {
    serde_json::json!([
        {"name": "email", "type": "email", "required": true}
    ])
}

/// A broader schema exercising several field types.
#[allow(dead_code)]
pub fn contact_schema() -> serde_json::Value {
    serde_json::json!([
        {"name": "email", "type": "email", "required": true},
        {"name": "age", "type": "number"},
        {"name": "subscribed", "type": "boolean"},
        {"name": "topic", "type": "select", "options": ["sales", "support"]},
        {"name": "note", "type": "text"}
    ])
}
